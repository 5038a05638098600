use faultline_config::{AnyOrArray, CorsConfig};
use http::header::HeaderName;
use http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a Tower CORS layer from configuration
///
/// Values were checked when the configuration was validated, so entries
/// that fail to parse here are skipped.
pub(crate) fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = match &config.origins {
        AnyOrArray::Any => AllowOrigin::any(),
        AnyOrArray::List(origins) => {
            AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
        }
    };

    let methods = match &config.methods {
        AnyOrArray::Any => AllowMethods::any(),
        AnyOrArray::List(methods) => {
            AllowMethods::list(methods.iter().filter_map(|m| Method::from_bytes(m.as_bytes()).ok()))
        }
    };

    let headers = match &config.headers {
        AnyOrArray::Any => AllowHeaders::any(),
        AnyOrArray::List(headers) => AllowHeaders::list(parse_names(headers)),
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .max_age(config.max_age_duration());

    if !config.expose_headers.is_empty() {
        layer = layer.expose_headers(parse_names(&config.expose_headers).collect::<Vec<_>>());
    }

    if config.credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

fn parse_names(names: &[String]) -> impl Iterator<Item = HeaderName> + '_ {
    names.iter().filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
}
