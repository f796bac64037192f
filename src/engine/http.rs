//! Built-in engine that replays a collection's requests directly.
//!
//! Each request is sent once with `{{variable}}` interpolation and checked
//! against [`Assertion::status_not_error`]. Every request is bounded by the
//! run's script timeout. JavaScript test scripts are not executed; they are
//! counted as skipped and shown in the report.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::{Engine, RunOptions, RunResult, RunTimings};
use crate::collections::{Body, Collection, FlatRequest, RequestSpec};
use crate::environment::{self, Environment};
use crate::error::{Error, Result};
use crate::http::client::HttpClient;
use crate::http::method::HttpMethod;
use crate::http::request::{RequestBody, RequestInput};
use crate::report::html;
use crate::testing::{Assertion, RequestOutcome, RunReport};

#[derive(Debug, Default)]
pub struct HttpEngine;

impl HttpEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for HttpEngine {
    fn name(&self) -> &'static str {
        "http"
    }

    fn run(&mut self, options: &RunOptions) -> Result<RunResult> {
        let collection =
            Collection::from_value(&options.collection.value).map_err(|source| Error::Parse {
                path: options.collection.path.clone(),
                source,
            })?;
        let environment =
            Environment::from_value(&options.environment.value).map_err(|source| Error::Parse {
                path: options.environment.path.clone(),
                source,
            })?;

        let variables = environment::build_variable_map(&collection.variable, &environment);
        let client = HttpClient::new(
            options.insecure,
            Duration::from_millis(options.script_timeout_ms),
        )?;

        let skipped_scripts = collection.test_script_count();
        if skipped_scripts > 0 {
            warn!(
                "{}: {skipped_scripts} test script(s) skipped, the http engine does not run scripts",
                collection.info.name
            );
        }

        let started = Utc::now().timestamp_millis();
        let outcomes: Vec<RequestOutcome> = collection
            .requests()
            .iter()
            .map(|request| execute(&client, request, &variables))
            .collect();
        let completed = Utc::now().timestamp_millis();

        let report = RunReport {
            collection: collection.info.name.clone(),
            environment: environment.name.clone(),
            started,
            completed,
            skipped_scripts,
            outcomes,
        };
        html::write_report(&options.report_path, &report)?;
        info!("Report written to {}", options.report_path.display());

        Ok(RunResult {
            stats: report.stats(),
            timings: RunTimings { started, completed },
        })
    }
}

fn execute(
    client: &HttpClient,
    request: &FlatRequest<'_>,
    variables: &HashMap<String, String>,
) -> RequestOutcome {
    let mut outcome = RequestOutcome {
        name: request.display_name(),
        ..Default::default()
    };

    let input = match resolve_request(&request.request.request, variables) {
        Ok(input) => input,
        Err(err) => {
            outcome.method = method_label(&request.request.request);
            outcome.error = Some(err.to_string());
            return outcome;
        }
    };
    outcome.method = input.method.to_string();
    outcome.url = input.url.clone();

    match client.send(input) {
        Ok(response) => {
            outcome.status = Some(response.status);
            outcome.status_text = response.status_text;
            outcome.duration_ms = response.duration_ms;
            outcome.size_bytes = response.size_bytes;
            outcome
                .assertions
                .push(Assertion::status_not_error().evaluate(response.status));
        }
        Err(err) => {
            warn!("{} failed: {err}", outcome.name);
            outcome.error = Some(err.to_string());
        }
    }

    outcome
}

fn method_label(spec: &RequestSpec) -> String {
    match spec {
        RequestSpec::Url(_) => HttpMethod::Get.to_string(),
        RequestSpec::Detailed(definition) => definition.method.to_uppercase(),
    }
}

/// Resolve all `{{var}}` placeholders and build a sendable request.
pub fn resolve_request(
    spec: &RequestSpec,
    variables: &HashMap<String, String>,
) -> Result<RequestInput> {
    let interpolate = |text: &str| environment::interpolate(text, variables);

    let definition = match spec {
        RequestSpec::Url(url) => {
            return Ok(RequestInput {
                method: HttpMethod::Get,
                url: interpolate(url.as_str()),
                headers: Vec::new(),
                body: RequestBody::None,
            });
        }
        RequestSpec::Detailed(definition) => definition,
    };

    let method = definition
        .method
        .parse::<HttpMethod>()
        .map_err(Error::InvalidRequest)?;
    let url = definition
        .url
        .as_ref()
        .map(|url| interpolate(url.raw()))
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| Error::InvalidRequest("request has no URL".to_string()))?;

    let headers = definition
        .header
        .iter()
        .filter(|header| !header.disabled)
        .map(|header| (interpolate(header.key.as_str()), interpolate(header.value.as_str())))
        .collect();

    let body = match &definition.body {
        Some(body) => resolve_body(body, &interpolate),
        None => RequestBody::None,
    };

    Ok(RequestInput {
        method,
        url,
        headers,
        body,
    })
}

fn resolve_body(body: &Body, interpolate: &dyn Fn(&str) -> String) -> RequestBody {
    match body.mode.as_str() {
        "raw" => body
            .raw
            .as_deref()
            .map(|raw| RequestBody::Raw(interpolate(raw)))
            .unwrap_or(RequestBody::None),
        "urlencoded" => RequestBody::Form(
            body.urlencoded
                .iter()
                .filter(|field| !field.disabled)
                .map(|field| (interpolate(field.key.as_str()), interpolate(field.value.as_str())))
                .collect(),
        ),
        other => {
            if !other.is_empty() {
                debug!("body mode `{other}` is not sent by the http engine");
            }
            RequestBody::None
        }
    }
}
