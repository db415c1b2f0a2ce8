use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use confportal_core::{DeliveryStrategy, EngineConfig};
use confportal_html::{Parameter, ParameterGroup, ParameterKind};
use confportal_web::{create_router, PortalConfig, PortalState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,confportal_core=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Configuration portal starting...");

    let addr: SocketAddr = "0.0.0.0:8080".parse()?;

    // Spill mode can be tried with:
    //   CONFPORTAL_SPILL=/tmp/portal.scratch confportal-server
    let engine = match std::env::var("CONFPORTAL_SPILL") {
        Ok(path) => EngineConfig {
            strategy: DeliveryStrategy::Spill {
                scratch_path: path.into(),
            },
            ..EngineConfig::default()
        },
        Err(_) => EngineConfig::default(),
    };

    let config = PortalConfig {
        title: "Config demo-thing".to_string(),
        config_version: "demo-1".to_string(),
        update_path: Some("/update".to_string()),
        engine,
    };

    let state = Arc::new(PortalState::new(config, system_groups(), custom_groups()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Portal ready!");
    tracing::info!("   Open:  http://localhost:8080/config");
    tracing::info!("   Try:   curl -N http://localhost:8080/config");

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Parameters every device carries: identity and portal access.
fn system_groups() -> Vec<ParameterGroup> {
    vec![ParameterGroup::new("system", "System")
        .with_param(
            Parameter::new("name", "Device name", ParameterKind::Text).with_value("demo-thing"),
        )
        .with_param(
            Parameter::new("portal_pass", "Portal password", ParameterKind::Password)
                .with_placeholder("leave empty to keep current"),
        )]
}

/// Application parameters for the demo: an MQTT uplink.
fn custom_groups() -> Vec<ParameterGroup> {
    vec![ParameterGroup::new("mqtt", "MQTT uplink")
        .with_param(
            Parameter::new("mqtt_host", "Broker host", ParameterKind::Text)
                .with_placeholder("broker.example.org"),
        )
        .with_param(
            Parameter::new(
                "mqtt_port",
                "Broker port",
                ParameterKind::Number {
                    min: Some(1),
                    max: Some(65535),
                },
            )
            .with_value("1883"),
        )
        .with_param(Parameter::new("mqtt_user", "Username", ParameterKind::Text))
        .with_param(Parameter::new("mqtt_pass", "Password", ParameterKind::Password))
        .with_param(Parameter::new("mqtt_tls", "Use TLS", ParameterKind::Checkbox))
        .with_param(Parameter::new(
            "report_mode",
            "Report mode",
            ParameterKind::Select {
                options: vec![
                    "interval".to_string(),
                    "on-change".to_string(),
                    "manual".to_string(),
                ],
            },
        ))]
}
