//! Payment gateway readiness check.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli payments check
//! ```
//!
//! Resolves the gateway exactly as the server does at startup and reports
//! whether it would be ready. Secret values are never printed.

use bazaar_server::config::{ConfigError, PaymentConfig, mask_key_id};
use bazaar_server::services::{DisabledReason, PaymentGateway};

/// Report payment readiness.
pub fn check() -> Result<(), ConfigError> {
    let config = PaymentConfig::from_env()?;
    let gateway = PaymentGateway::from_config(&config);

    #[allow(clippy::print_stdout)]
    {
        match &gateway {
            PaymentGateway::Ready(client) => {
                println!("Payments: ready");
                println!("  key id:   {}", mask_key_id(client.key_id()));
                println!("  api base: {}", config.api_base);
            }
            PaymentGateway::Disabled(DisabledReason::MissingCredentials(missing)) => {
                println!("Payments: disabled");
                for var in missing {
                    println!("  missing:  {var}");
                }
            }
            PaymentGateway::Disabled(reason) => {
                println!("Payments: disabled ({reason})");
            }
        }
    }
    Ok(())
}
