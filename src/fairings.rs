//! Request logging and last-resort error capture for the ATM HTTP boundary
//!
//! Traffic falls into three groups. The view layer polls `GET /state`
//! constantly. Wallet actions (`/detect`, `/restore`, `/connect`,
//! `/logout`) change the session. ATM actions (`/refresh`, `/deposit`,
//! `/withdraw`, `/borrow`, `/transfer`) touch the chain. Only the last two
//! are logged at info level.

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Status;
use rocket::{Data, Request, Response};

/// Which part of the ATM client a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// State polling, the welcome page and the OpenAPI document
    Read,
    /// Session changes against the wallet provider
    Wallet,
    /// Balance reads and transactions against the ATM contract
    Atm,
}

impl RequestClass {
    pub fn of(path: &str) -> Self {
        match path {
            "/detect" | "/restore" | "/connect" | "/logout" => RequestClass::Wallet,
            "/refresh" | "/deposit" | "/withdraw" | "/borrow" | "/transfer" => RequestClass::Atm,
            _ => RequestClass::Read,
        }
    }

    fn label(self) -> &'static str {
        match self {
            RequestClass::Read => "read",
            RequestClass::Wallet => "wallet",
            RequestClass::Atm => "atm",
        }
    }
}

/// Logs wallet and ATM actions with their outcome; polling stays at debug level.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "ATM Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let class = RequestClass::of(request.uri().path().as_str());
        let remote = request
            .remote()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        match class {
            RequestClass::Read => {
                tracing::debug!("{} {} from {}", request.method(), request.uri(), remote)
            }
            _ => tracing::info!(
                "[{}] {} {} from {}",
                class.label(),
                request.method(),
                request.uri(),
                remote
            ),
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let class = RequestClass::of(request.uri().path().as_str());
        let status = response.status();

        if !status.class().is_success() {
            // Typed failures; the service has already reported them
            tracing::warn!("[{}] {} returned {}", class.label(), request.uri(), status);
        } else if class == RequestClass::Read {
            tracing::debug!("{} returned {}", request.uri(), status);
        } else {
            tracing::info!("[{}] {} returned {}", class.label(), request.uri(), status);
        }
    }
}

/// Sends 500 responses to Sentry. Typed ATM failures never map to 500 except
/// a binding fault, so these are panics or provider-level bugs.
pub struct PanicCatcher;

#[rocket::async_trait]
impl Fairing for PanicCatcher {
    fn info(&self) -> Info {
        Info {
            name: "ATM Panic Catcher",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if response.status() != Status::InternalServerError {
            return;
        }

        let class = RequestClass::of(request.uri().path().as_str());
        tracing::error!(
            "Internal Server Error for {} {} ({} request)",
            request.method(),
            request.uri(),
            class.label()
        );

        sentry::with_scope(
            |scope| scope.set_tag("request_class", class.label()),
            || {
                sentry::capture_message(
                    &format!("Internal Server Error: {} {}", request.method(), request.uri()),
                    sentry::Level::Error,
                )
            },
        );
    }
}
