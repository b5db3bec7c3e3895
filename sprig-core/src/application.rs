// Application bootstrapper and HTTP server

use crate::config::ContextConfig;
use crate::convert::ConversionTable;
use crate::dispatcher::{DispatchOutcome, Dispatcher, FAILURE_PREFIX};
use crate::http::{HttpResponse, ResponseSink, WebRequest};
use crate::injector::{InjectionReport, Injector};
use crate::routing::RouteTable;
use crate::scanner::{ComponentDescriptor, Scanner};
use crate::{Container, Error, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::body::{Body, Incoming as IncomingBody};
use hyper::{Request, Response, header};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// A bootstrapped, immutable application
///
/// Holds the bean registry, the route table and a dispatcher over them.
/// Everything here is read-only after [`bootstrap`](Self::bootstrap), so the
/// context can be shared across request threads without locking.
#[derive(Debug)]
pub struct ApplicationContext {
    config: ContextConfig,
    container: Arc<Container>,
    dispatcher: Dispatcher,
    report: InjectionReport,
}

impl ApplicationContext {
    /// Scan, register, inject and build routes from the linked components
    pub fn bootstrap(config: ContextConfig) -> Result<Self> {
        Self::bootstrap_from(config, crate::scanner::registered_components(), ConversionTable::default())
    }

    /// Bootstrap from an explicit descriptor source and conversion table
    pub fn bootstrap_from<'a, I>(
        config: ContextConfig,
        source: I,
        converters: ConversionTable,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ComponentDescriptor>,
    {
        info!(scan_package = %config.scan_package, "Bootstrapping Sprig application");

        let found = Scanner::new(&config.scan_package).scan_from(source)?;
        let container = Container::from_descriptors(found)?;
        let report = Injector::new(config.missing_dependency).inject(&container)?;
        let routes = Arc::new(RouteTable::build(&container, config.route_mode)?);

        info!(
            beans = container.len(),
            aliases = container.alias_count(),
            injected = report.injected,
            unresolved = report.unresolved.len(),
            routes = routes.len(),
            "Application bootstrap complete"
        );

        Ok(Self {
            config,
            container: Arc::new(container),
            dispatcher: Dispatcher::new(routes, converters),
            report,
        })
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn routes(&self) -> &RouteTable {
        self.dispatcher.routes()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// What the injection pass did
    pub fn injection_report(&self) -> &InjectionReport {
        &self.report
    }

    /// Dispatch into a caller-supplied sink
    pub fn dispatch(&self, request: &WebRequest, response: &mut dyn ResponseSink) -> DispatchOutcome {
        self.dispatcher.dispatch(request, response)
    }

    /// Dispatch and build a complete response
    ///
    /// Requests without a context path get the configured one.
    pub fn handle(&self, mut request: WebRequest) -> HttpResponse {
        if request.context_path.is_empty() {
            request.context_path = self.config.context_path.clone();
        }

        let mut response = HttpResponse::ok()
            .with_header("Content-Type".to_string(), "text/plain; charset=utf-8".to_string());
        let outcome = self.dispatcher.dispatch(&request, &mut response);
        response.status = outcome.status();
        response
    }
}

/// Largest request body read by default (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// HTTP front end for an [`ApplicationContext`]
pub struct Application {
    context: Arc<ApplicationContext>,
    body_limit: usize,
}

impl Application {
    pub fn new(context: ApplicationContext) -> Self {
        Self {
            context: Arc::new(context),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Reject request bodies larger than `bytes` with a 413
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }

    /// Bind `addr` and serve until the process exits
    pub async fn listen(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!(addr = %listener.local_addr()?, body_limit = self.body_limit, "Server listening");
        let body_limit = self.body_limit;

        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let context = self.context.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let context = context.clone();
                    async move { handle_request(req, context, body_limit).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(peer = %peer, error = %err, "Error serving connection");
                }
            });
        }
    }
}

/// Convert, dispatch on the blocking pool, convert back
async fn handle_request(
    req: Request<IncomingBody>,
    context: Arc<ApplicationContext>,
    body_limit: usize,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match read_body(body, body_limit).await {
        Ok(body) => body,
        Err(response) => return Ok(to_hyper_response(response)),
    };

    let response = match to_web_request(&parts, &body) {
        Ok(request) => {
            match tokio::task::spawn_blocking(move || context.handle(request)).await {
                Ok(response) => response,
                Err(err) => failure(Error::Http(format!("dispatch task failed: {}", err))),
            }
        }
        Err(err) => failure(err),
    };

    Ok(to_hyper_response(response))
}

/// Collect at most `limit` bytes of a request body
async fn read_body<B>(body: B, limit: usize) -> std::result::Result<Bytes, HttpResponse>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.is::<LengthLimitError>() => {
            debug!(limit, "Request body over limit");
            Err(HttpResponse::new(413).with_body(
                format!("413 Payload Too Large, limit {} bytes", limit).into_bytes(),
            ))
        }
        Err(err) => {
            debug!(error = %err, "Failed to read request body");
            Err(HttpResponse::new(400).with_body(b"400 Bad Request".to_vec()))
        }
    }
}

fn to_web_request(parts: &::http::request::Parts, body: &Bytes) -> Result<WebRequest> {
    let mut request = WebRequest::new(parts.method.as_str(), parts.uri.path());

    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    if let Some(query) = parts.uri.query() {
        request = request.with_query(query)?;
    }

    let is_form = request
        .header(header::CONTENT_TYPE.as_str())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form && !body.is_empty() {
        request = request.with_form_body(body)?;
    }

    Ok(request)
}

fn failure(err: Error) -> HttpResponse {
    error!(error = %err, "Request failed before dispatch");
    HttpResponse::internal_server_error()
        .with_body(format!("{}{}", FAILURE_PREFIX, err.diagnostic()).into_bytes())
}

fn to_hyper_response(response: HttpResponse) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(response.status);
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    builder
        .body(Full::new(Bytes::from(response.body)))
        .unwrap_or_else(|err| {
            error!(error = %err, "Invalid response head");
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_web_request_merges_query_and_form() {
        let req = Request::post("/app/demo/add?a=1")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();

        let request = to_web_request(&parts, &Bytes::from_static(b"b=2&a=3")).unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/app/demo/add");
        assert_eq!(request.param_values("a").unwrap(), ["1", "3"]);
        assert_eq!(request.param("b"), Some("2"));
    }

    #[test]
    fn test_form_body_ignored_without_content_type() {
        let (parts, _) = Request::post("/x").body(()).unwrap().into_parts();
        let request = to_web_request(&parts, &Bytes::from_static(b"a=1")).unwrap();
        assert!(request.params().is_empty());
    }

    #[test]
    fn test_body_within_limit_is_read() {
        let body = Full::new(Bytes::from_static(b"name=World"));
        let bytes = tokio_test::block_on(read_body(body, 16)).unwrap();
        assert_eq!(bytes, Bytes::from_static(b"name=World"));
    }

    #[test]
    fn test_body_over_limit_is_413() {
        let body = Full::new(Bytes::from(vec![b'a'; 64]));
        let response = tokio_test::block_on(read_body(body, 16)).unwrap_err();
        assert_eq!(response.status, 413);
        assert!(response.body_str().contains("limit 16 bytes"));
    }

    #[test]
    fn test_failure_response() {
        let response = failure(Error::Http("bad".to_string()));
        assert_eq!(response.status, 500);
        assert!(response.body_str().starts_with(FAILURE_PREFIX));
    }
}
