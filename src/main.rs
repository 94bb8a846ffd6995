use clap::Parser;
use e2c_gateway::application::gateway::GatewayClient;
use e2c_gateway::config::{Args, Command, GatewayArgs};
use e2c_gateway::domain::card::NewCard;
use e2c_gateway::domain::fields::Amount;
use e2c_gateway::domain::payment::NewPayment;
use e2c_gateway::infrastructure::cryptopro::CryptoProSigner;
use e2c_gateway::infrastructure::http::ReqwestTransport;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let signer = CryptoProSigner::new(args.cryptopro.to_config());

    match args.command {
        Command::Containers => print(&signer.list_containers().await.into_diagnostic()?),
        Command::Certificates => print(&signer.list_certificates().await.into_diagnostic()?),
        Command::Serial => print(&signer.certificate_serial().await.into_diagnostic()?),
        Command::CheckTypes => print(GatewayClient::card_check_types()),
        Command::CreatePayment {
            order_id,
            card_id,
            amount,
            client_id,
            metadata,
        } => {
            let client = gateway(&args.gateway, signer)?;
            let amount = Amount::new(amount).into_diagnostic()?;
            let mut payment = NewPayment::new(order_id, card_id, amount);
            payment.client_id = client_id;
            if !metadata.is_empty() {
                payment = payment.with_metadata(metadata);
            }
            print(&client.create_payment(payment).await.into_diagnostic()?)
        }
        Command::AdvancePayment { payment_id } => {
            let client = gateway(&args.gateway, signer)?;
            print(&client.advance_payment(&payment_id).await.into_diagnostic()?)
        }
        Command::FetchPayment { payment_id } => {
            let client = gateway(&args.gateway, signer)?;
            print(&client.fetch_payment(&payment_id).await.into_diagnostic()?)
        }
        Command::CreateClient {
            client_id,
            email,
            phone,
        } => {
            let client = gateway(&args.gateway, signer)?;
            let customer = client
                .create_client(&client_id, email.as_deref(), phone.as_deref())
                .await
                .into_diagnostic()?;
            print(&customer)
        }
        Command::DeleteClient { client_id } => {
            let client = gateway(&args.gateway, signer)?;
            print(&client.delete_client(&client_id).await.into_diagnostic()?)
        }
        Command::FetchClient { client_id } => {
            let client = gateway(&args.gateway, signer)?;
            print(&client.fetch_client(&client_id).await.into_diagnostic()?)
        }
        Command::CreateCard {
            client_id,
            check_type,
            comment,
            form_type,
        } => {
            let client = gateway(&args.gateway, signer)?;
            let card = NewCard {
                client_id,
                check_type,
                comment,
                form_type,
            };
            print(&client.create_card(card).await.into_diagnostic()?)
        }
        Command::DeleteCard { card_id, client_id } => {
            let client = gateway(&args.gateway, signer)?;
            print(&client.delete_card(card_id, &client_id).await.into_diagnostic()?)
        }
        Command::ListCards { client_id } => {
            let client = gateway(&args.gateway, signer)?;
            print(&client.list_cards(&client_id).await.into_diagnostic()?)
        }
    }
}

fn gateway(args: &GatewayArgs, signer: CryptoProSigner) -> Result<GatewayClient> {
    let config = args.to_config().into_diagnostic()?;
    let transport = ReqwestTransport::new().into_diagnostic()?;
    Ok(GatewayClient::new(config, Box::new(signer), Box::new(transport)))
}

fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
