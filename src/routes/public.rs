use actix_web::http::header::Header;
use actix_web::{http::header, http::StatusCode, web, HttpRequest, HttpResponse};
use actix_web_httpauth::headers::authorization::{Authorization, Basic};
use askama::Template;
use serde::Deserialize;

use crate::{
    auth::{authenticate_credentials, clear_logout_cookie, logout_cookie, AUTH_REALM},
    clock,
    db,
    error::FieldError,
    filters,
    models::{Banner, Review, Service},
    state::{AppState, ServerEvent},
    templates::{render, render_with_status},
    validation::{self, BookingForm, ContactForm, ReviewForm},
};

const SUBMIT_FAILED: &str = "Failed to submit. Please try again.";
const TESTIMONIAL_LIMIT: i64 = 6;

#[derive(Clone, Debug, Default)]
struct ContactView {
    name: String,
    email: String,
    phone: String,
    service: String,
    message: String,
}

impl From<ContactForm> for ContactView {
    fn from(form: ContactForm) -> Self {
        Self {
            name: form.name,
            email: form.email.unwrap_or_default(),
            phone: form.phone,
            service: form.service,
            message: form.message.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    banners: Vec<Banner>,
    services: Vec<Service>,
    reviews: Vec<Review>,
    form: ContactView,
    errors: Vec<FieldError>,
}

#[derive(Template)]
#[template(path = "services.html")]
struct ServicesTemplate {
    services: Vec<Service>,
}

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    form: ContactView,
    errors: Vec<FieldError>,
}

#[derive(Clone, Debug)]
struct ServiceChoice {
    id: String,
    name: String,
    selected: bool,
}

#[derive(Clone, Debug, Default)]
struct BookingView {
    full_name: String,
    phone: String,
    email: String,
    preferred_date: String,
    message: String,
}

impl From<BookingForm> for BookingView {
    fn from(form: BookingForm) -> Self {
        Self {
            full_name: form.full_name,
            phone: form.phone,
            email: form.email.unwrap_or_default(),
            preferred_date: form.preferred_date,
            message: form.message.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "book.html")]
struct BookingTemplate {
    services: Vec<ServiceChoice>,
    form: BookingView,
    errors: Vec<FieldError>,
    min_date: String,
}

#[derive(Clone, Debug)]
struct RatingChoice {
    value: u8,
    checked: bool,
}

#[derive(Clone, Debug, Default)]
struct ReviewView {
    name: String,
    email: String,
    review: String,
}

#[derive(Template)]
#[template(path = "review.html")]
struct ReviewTemplate {
    ratings: Vec<RatingChoice>,
    form: ReviewView,
    errors: Vec<FieldError>,
}

#[derive(Template)]
#[template(path = "submitted.html")]
struct SubmittedTemplate {
    heading: &'static str,
    message: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/services").route(web::get().to(list_services)))
        .service(
            web::resource("/book")
                .route(web::get().to(show_booking))
                .route(web::post().to(create_booking)),
        )
        .service(
            web::resource("/contact")
                .route(web::get().to(show_contact))
                .route(web::post().to(create_contact)),
        )
        .service(
            web::resource("/review")
                .route(web::get().to(show_review))
                .route(web::post().to(create_review)),
        )
        .service(web::resource("/login").route(web::get().to(login)))
        .service(web::resource("/auth").route(web::get().to(login)))
        .service(web::resource("/logout").route(web::get().to(logout)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

pub async fn not_found() -> HttpResponse {
    render_with_status(NotFoundTemplate, StatusCode::NOT_FOUND)
}

async fn logout(req: HttpRequest) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/"))
        .cookie(logout_cookie(&req))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

#[derive(Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

async fn login(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<LoginQuery>,
) -> HttpResponse {
    let auth = match Authorization::<Basic>::parse(&req) {
        Ok(auth) => auth,
        Err(_) => return auth_challenge(),
    };
    let credentials = auth.into_scheme();
    let username = credentials.user_id();
    let password = credentials.password().unwrap_or_default();

    let user = match authenticate_credentials(&state, username, password).await {
        Some(user) => user,
        None => return auth_challenge(),
    };
    if !user.can_manage() {
        return HttpResponse::Forbidden()
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .body("Admin access required");
    }

    let requested = query.next.as_deref().unwrap_or("");
    let redirect = if requested.starts_with("/admin") {
        requested
    } else {
        "/admin/dashboard"
    };

    log::info!("{} signed in", user.display_name);
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, redirect))
        .cookie(clear_logout_cookie(&req))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

fn auth_challenge() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", AUTH_REALM)))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Public pages degrade to empty sections rather than failing outright.
fn or_empty<T>(result: Result<Vec<T>, sqlx::Error>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|err| {
        log::error!("Error fetching {what}: {err}");
        Vec::new()
    })
}

async fn home(state: web::Data<AppState>) -> HttpResponse {
    let banners = or_empty(db::banners::list_active(&state.db).await, "banners");
    let services = or_empty(db::services::list_active(&state.db).await, "services");
    let reviews = or_empty(
        db::reviews::list_approved(&state.db, TESTIMONIAL_LIMIT).await,
        "reviews",
    );

    render(HomeTemplate {
        banners,
        services,
        reviews,
        form: ContactView::default(),
        errors: Vec::new(),
    })
}

async fn list_services(state: web::Data<AppState>) -> HttpResponse {
    let services = or_empty(db::services::list_active(&state.db).await, "services");
    render(ServicesTemplate { services })
}

async fn show_contact() -> HttpResponse {
    render(ContactTemplate {
        form: ContactView::default(),
        errors: Vec::new(),
    })
}

async fn create_contact(
    state: web::Data<AppState>,
    form: web::Form<ContactForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let draft = match validation::contact(&form) {
        Ok(draft) => draft,
        Err(errors) => {
            return render_with_status(
                ContactTemplate {
                    form: form.into(),
                    errors,
                },
                StatusCode::BAD_REQUEST,
            );
        }
    };

    match db::leads::insert(&state.db, &draft).await {
        Ok(lead) => {
            log::info!("Contact enquiry {} captured", lead.id);
            state.publish(ServerEvent::lead_created(&lead));
            render(SubmittedTemplate {
                heading: "Thank you!",
                message: "We've received your message and will get back to you soon.".to_string(),
            })
        }
        Err(err) => {
            log::error!("Error inserting lead: {err}");
            render_with_status(
                ContactTemplate {
                    form: form.into(),
                    errors: vec![FieldError::new("form", SUBMIT_FAILED)],
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

#[derive(Deserialize)]
struct BookingQuery {
    service: Option<String>,
}

async fn booking_choices(state: &AppState, selected: Option<&str>) -> Vec<ServiceChoice> {
    or_empty(db::services::list_active(&state.db).await, "services")
        .into_iter()
        .map(|service| ServiceChoice {
            selected: selected == Some(service.id.as_str()),
            id: service.id,
            name: service.name,
        })
        .collect()
}

fn min_date(state: &AppState) -> String {
    clock::local_date(clock::now_utc(), state.offset())
        .format("%Y-%m-%d")
        .to_string()
}

async fn show_booking(
    state: web::Data<AppState>,
    query: web::Query<BookingQuery>,
) -> HttpResponse {
    render(BookingTemplate {
        services: booking_choices(&state, query.service.as_deref()).await,
        form: BookingView::default(),
        errors: Vec::new(),
        min_date: min_date(&state),
    })
}

async fn create_booking(
    state: web::Data<AppState>,
    form: web::Form<BookingForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let service = match db::services::get_active(&state.db, form.service_id.trim()).await {
        Ok(service) => service,
        Err(err) => {
            log::error!("Error fetching service {}: {err}", form.service_id);
            return booking_failed(&state, form, vec![FieldError::new("form", SUBMIT_FAILED)])
                .await;
        }
    };

    let draft = match validation::booking(
        &form,
        service.as_ref().map(|service| service.name.as_str()),
        clock::now_utc(),
        state.offset(),
    ) {
        Ok(draft) => draft,
        Err(errors) => return booking_failed(&state, form, errors).await,
    };

    match db::leads::insert(&state.db, &draft).await {
        Ok(lead) => {
            log::info!("Booking request {} captured", lead.id);
            state.publish(ServerEvent::lead_created(&lead));
            render(SubmittedTemplate {
                heading: "Booking request received",
                message: format!(
                    "Thanks {}! We'll call you shortly to confirm your {}.",
                    lead.full_name,
                    lead.service_interested.as_deref().unwrap_or("appointment")
                ),
            })
        }
        Err(err) => {
            log::error!("Error inserting lead: {err}");
            booking_failed(&state, form, vec![FieldError::new("form", SUBMIT_FAILED)]).await
        }
    }
}

async fn booking_failed(
    state: &AppState,
    form: BookingForm,
    errors: Vec<FieldError>,
) -> HttpResponse {
    let status = if errors.iter().any(|error| error.field == "form") {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };
    let services = booking_choices(state, Some(form.service_id.trim())).await;
    render_with_status(
        BookingTemplate {
            services,
            form: form.into(),
            errors,
            min_date: min_date(state),
        },
        status,
    )
}

fn rating_choices(selected: Option<&str>) -> Vec<RatingChoice> {
    let selected = selected.and_then(|value| value.trim().parse::<u8>().ok());
    (1..=5)
        .rev()
        .map(|value| RatingChoice {
            value,
            checked: selected == Some(value),
        })
        .collect()
}

async fn show_review() -> HttpResponse {
    render(ReviewTemplate {
        ratings: rating_choices(None),
        form: ReviewView::default(),
        errors: Vec::new(),
    })
}

fn review_page(form: ReviewForm, errors: Vec<FieldError>, status: StatusCode) -> HttpResponse {
    render_with_status(
        ReviewTemplate {
            ratings: rating_choices(form.rating.as_deref()),
            form: ReviewView {
                name: form.name,
                email: form.email.unwrap_or_default(),
                review: form.review,
            },
            errors,
        },
        status,
    )
}

async fn create_review(
    state: web::Data<AppState>,
    form: web::Form<ReviewForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let draft = match validation::review(&form) {
        Ok(draft) => draft,
        Err(errors) => return review_page(form, errors, StatusCode::BAD_REQUEST),
    };

    match db::reviews::insert(&state.db, &draft).await {
        Ok(review) => {
            log::info!("Review {} awaiting approval", review.id);
            state.publish(ServerEvent::review_submitted(&review));
            render(SubmittedTemplate {
                heading: "Thank you for your review!",
                message: "It will appear on our website once approved.".to_string(),
            })
        }
        Err(err) => {
            log::error!("Error inserting review: {err}");
            review_page(
                form,
                vec![FieldError::new("form", SUBMIT_FAILED)],
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}
