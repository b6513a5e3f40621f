// Roster
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! REST service to manage student records.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use axum::Router;
use axum::http::HeaderValue;
use log::info;
use roster_core::db::DbOptions;
use roster_core::env::{get_optional_var, get_var};
use std::error::Error;
use std::net::Ipv4Addr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

mod db;
mod driver;
use driver::Driver;
mod model;
mod rest;
use rest::app;

/// Default origin allowed to issue cross-origin requests.
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Default port to listen on.
const DEFAULT_PORT: u16 = 8000;

/// Configuration for the whole service.
#[derive(Debug)]
pub struct ServiceOptions {
    /// Options to connect to the database.
    pub db: DbOptions,

    /// Origins allowed to issue cross-origin requests.
    pub cors_origins: Vec<String>,

    /// Port to listen on, on all interfaces.
    pub port: u16,
}

impl ServiceOptions {
    /// Creates a set of options from environment variables.
    ///
    /// This will use `DATABASE_URL` and the other `DATABASE_*` variables for the database,
    /// `CORS_ORIGINS` as a comma-separated list of allowed origins, and `PORT`.
    pub fn from_env() -> Result<Self, String> {
        let cors_origins = get_optional_var::<Vec<String>>("CORS", "ORIGINS")?
            .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_owned()]);
        Ok(Self {
            db: DbOptions::from_env("DATABASE")?,
            cors_origins,
            port: get_var::<u16>("PORT")?.unwrap_or(DEFAULT_PORT),
        })
    }
}

/// Builds the cross-origin policy for the given `origins`.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, String> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| format!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<Result<Vec<HeaderValue>, String>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Wraps the application `router` with the cross-origin policy for `origins`.
fn with_cors(router: Router, origins: &[String]) -> Result<Router, String> {
    Ok(router.layer(cors_layer(origins)?))
}

/// Instantiates all resources to serve the application as configured by `opts`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(opts: ServiceOptions) -> Result<(), Box<dyn Error>> {
    let db = roster_core::db::connect(opts.db).await?;
    db::init_schema(&mut db.ex().await?).await?;

    let driver = Driver::new(db.clone());
    let app = with_cors(app(driver), &opts.cors_origins)?;

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, opts.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::TestContext;
    use axum::http;
    use roster_core::rest::testutils::OneShotBuilder;

    #[test]
    fn test_options_from_env_all_present() {
        let overrides = [
            ("DATABASE_URL", Some("sqlite::memory:")),
            ("DATABASE_MAX_CONNECTIONS", Some("5")),
            ("CORS_ORIGINS", Some("http://a.example.com, http://b.example.com")),
            ("PORT", Some("1234")),
        ];
        temp_env::with_vars(overrides, || {
            let opts = ServiceOptions::from_env().unwrap();
            assert_eq!("sqlite::memory:", opts.db.url);
            assert_eq!(Some(5), opts.db.max_connections);
            assert_eq!(
                vec!["http://a.example.com".to_owned(), "http://b.example.com".to_owned()],
                opts.cors_origins
            );
            assert_eq!(1234, opts.port);
        });
    }

    #[test]
    fn test_options_from_env_use_defaults() {
        let overrides = [
            ("DATABASE_URL", Some("sqlite::memory:")),
            ("DATABASE_MAX_CONNECTIONS", None),
            ("CORS_ORIGINS", None),
            ("PORT", None),
        ];
        temp_env::with_vars(overrides, || {
            let opts = ServiceOptions::from_env().unwrap();
            assert_eq!(None, opts.db.max_connections);
            assert_eq!(vec![DEFAULT_CORS_ORIGIN.to_owned()], opts.cors_origins);
            assert_eq!(DEFAULT_PORT, opts.port);
        });
    }

    #[test]
    fn test_options_from_env_missing_database() {
        temp_env::with_vars_unset(["DATABASE_URL"], || {
            let err = ServiceOptions::from_env().unwrap_err();
            assert_eq!("Required environment variable DATABASE_URL not present", err);
        });
    }

    #[test]
    fn test_options_from_env_bad_port() {
        let overrides = [("DATABASE_URL", Some("sqlite::memory:")), ("PORT", Some("http"))];
        temp_env::with_vars(overrides, || {
            let err = ServiceOptions::from_env().unwrap_err();
            assert!(err.contains("PORT"), "Unexpected error: {}", err);
        });
    }

    #[test]
    fn test_cors_layer_bad_origin() {
        let err = cors_layer(&["http://bad\norigin".to_owned()]).unwrap_err();
        assert!(err.starts_with("Invalid CORS origin"), "Unexpected error: {}", err);
    }

    /// Sends a preflight request from `origin` to an app that allows `DEFAULT_CORS_ORIGIN`.
    async fn preflight(origin: &str) -> http::Response<axum::body::Body> {
        let app = TestContext::setup().await.into_app();
        let app = with_cors(app, &[DEFAULT_CORS_ORIGIN.to_owned()]).unwrap();
        OneShotBuilder::new(app, (http::Method::OPTIONS, "/students"))
            .with_header(http::header::ORIGIN, origin)
            .with_header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .with_header(http::header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .send_empty()
            .await
            .take_response()
            .await
    }

    #[tokio::test]
    async fn test_cors_allowed_origin() {
        let response = preflight(DEFAULT_CORS_ORIGIN).await;
        let headers = response.headers();
        assert_eq!(
            DEFAULT_CORS_ORIGIN,
            headers.get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap()
        );
        assert_eq!("true", headers.get(http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap());
        assert_eq!("POST", headers.get(http::header::ACCESS_CONTROL_ALLOW_METHODS).unwrap());
        assert_eq!(
            "content-type",
            headers.get(http::header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap()
        );
    }

    #[tokio::test]
    async fn test_cors_unknown_origin() {
        let response = preflight("http://evil.example.com").await;
        assert!(response.headers().get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
