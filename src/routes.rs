use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, guard, http::Method, web};

use crate::error::AppError;
use crate::gpio::{GpioBackend, PinController};

/// Cookie carrying the caller's credential.
pub const CREDENTIAL_COOKIE: &str = "key";

pub struct AppState<B: GpioBackend> {
    pub controller: Arc<PinController<B>>,
}

impl<B: GpioBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
        }
    }
}

impl<B: GpioBackend + 'static> AppState<B> {
    pub fn api_scope(&self, base_path: &str) -> actix_web::Scope {
        web::scope(base_path)
            .service(
                web::resource("/pins")
                    .route(web::get().to(accessible_pins::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins/{number}/on")
                    .route(web::post().to(pin_on::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins/{number}/off")
                    .route(web::post().to(pin_off::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins/{number}/blink")
                    .route(web::post().to(pin_blink::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
    }
}

async fn accessible_pins<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, AppError> {
    let credential = credential(&req);
    let pins = state.controller.accessible_pins(credential.as_deref());

    Ok(web::Json(pins.to_vec()))
}

// Denied requests get the same response as applied ones.

async fn pin_on<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, AppError> {
    let number = parse_pin_number(&req)?;
    let credential = credential(&req);

    let _ = state
        .controller
        .turn_on(credential.as_deref(), number)
        .await?;

    Ok(HttpResponse::Ok())
}

async fn pin_off<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, AppError> {
    let number = parse_pin_number(&req)?;
    let credential = credential(&req);

    let _ = state
        .controller
        .turn_off(credential.as_deref(), number)
        .await?;

    Ok(HttpResponse::Ok())
}

async fn pin_blink<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, AppError> {
    let number = parse_pin_number(&req)?;
    let credential = credential(&req);

    let _ = state
        .controller
        .blink(credential.as_deref(), number)
        .await?;

    Ok(HttpResponse::Ok())
}

fn credential(req: &HttpRequest) -> Option<String> {
    req.cookie(CREDENTIAL_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

fn parse_pin_number(req: &HttpRequest) -> Result<u32, AppError> {
    let number = req
        .match_info()
        .get("number")
        .ok_or_else(|| AppError::InvalidValue("Missing pin number".into()))?;
    let number = number
        .parse::<u32>()
        .map_err(|_| AppError::InvalidValue("Invalid pin number".into()))?;

    Ok(number)
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().finish()
}

fn guard_not_methods(methods: &[Method]) -> impl guard::Guard {
    let allowed: Vec<Method> = methods.to_vec();
    guard::fn_guard(move |ctx| !allowed.iter().any(|m| m == ctx.head().method))
}
