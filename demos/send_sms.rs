use std::io;
use std::sync::Arc;

use magfa_gateway::{
    GatewayConfig, PhoneNumber, RawPhoneNumber, SendOutcome, SendSms, SmsGatewayClient,
};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

fn load_config() -> Result<GatewayConfig, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("MAGFA_CONFIG") {
        let contents = std::fs::read_to_string(&path)?;
        return Ok(GatewayConfig::from_toml_str(&contents)?);
    }

    Ok(GatewayConfig::new(
        required_env("MAGFA_USERNAME")?,
        required_env("MAGFA_PASSWORD")?,
        std::env::var("MAGFA_DOMAIN").unwrap_or_else(|_| "magfa".to_owned()),
        required_env("MAGFA_SENDER")?,
    )?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let phone_raw = required_env("MAGFA_PHONE")?;
    let message = std::env::var("MAGFA_MESSAGE")
        .unwrap_or_else(|_| "Hello from the magfa-gateway demo.".to_owned());

    let config = Arc::new(load_config()?);
    let client = SmsGatewayClient::new(Arc::clone(&config))?;

    // Anything that owns the sender can push a rotated config; the demo keeps it idle.
    let (updates, receiver) = watch::channel(config);
    let follower = client.follow(receiver);

    let phone: RawPhoneNumber =
        PhoneNumber::parse(Some(PhoneNumber::DEFAULT_REGION), phone_raw)?.into();
    match client.send_sms(SendSms::to_one(message, phone)).await? {
        SendOutcome::Queued { code } => println!("queued, message id: {code}"),
        SendOutcome::Indeterminate => println!("sent, delivery status unknown"),
    }

    drop(updates);
    follower.await?;
    Ok(())
}
