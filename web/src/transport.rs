//! Executes the core client's request descriptions over the network.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use todo_core::{HttpMethod, HttpRequest, HttpResponse, PartValue, RequestBody};

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn multipart(parts: Vec<todo_core::FormPart>) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for part in parts {
        form = match part.value {
            PartValue::Text(text) => form.text(part.name, text),
            PartValue::File {
                file_name,
                content_type,
                bytes,
            } => form.part(
                part.name,
                Part::bytes(bytes).file_name(file_name).mime_str(&content_type)?,
            ),
        };
    }
    Ok(form)
}

/// Send `request` and hand back the response as plain data.
///
/// Only transport failures are errors here; every HTTP status is returned so
/// the core client decides what it means.
pub async fn execute(http: &reqwest::Client, request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
    let verb = request.method;
    tracing::debug!(method = verb.as_str(), url = %request.path, "sending API request");

    let mut builder = http.request(method(verb), &request.path);
    for (key, value) in &request.headers {
        builder = builder.header(key, value);
    }
    builder = match request.body {
        None => builder,
        Some(RequestBody::Json(body)) => builder.body(body),
        Some(RequestBody::Multipart(parts)) => builder.multipart(multipart(parts)?),
    };

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = response.text().await?;

    tracing::debug!(method = verb.as_str(), url = %request.path, status, "API responded");
    Ok(HttpResponse { status, headers, body })
}
