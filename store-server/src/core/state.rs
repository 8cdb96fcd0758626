//! Server state - shared handles for all services
//!
//! `ServerState` is cloned per request; every field is either `Clone`-cheap
//! or Arc-backed. Gateways and carriers sit behind trait objects so tests
//! can inject failing fakes.

use std::sync::Arc;

use crate::core::Config;
use crate::db::DbService;
use crate::geo::GeoLookup;
use crate::notify::{EmailSender, Notifier, WhatsAppClient};
use crate::orders::OrderService;
use crate::payment::{PaymentService, PhonePeGateway, RazorpayGateway};
use crate::shipping::{DelhiveryCarrier, RapidShypCarrier, ShippingService, TokenCache};
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub orders: OrderService,
    pub payment: PaymentService,
    pub shipping: ShippingService,
    pub notifier: Notifier,
    pub geo: GeoLookup,
}

impl ServerState {
    /// Wire up all services from configuration
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;

        let notifier = Notifier::new(
            EmailSender::from_config(&config.smtp),
            WhatsAppClient::from_config(&config.whatsapp),
        );

        let payment = PaymentService::new(
            Arc::new(RazorpayGateway::new(config.razorpay.clone())),
            Arc::new(PhonePeGateway::new(config.phonepe.clone())),
        );

        let tokens = Arc::new(TokenCache::new());
        let shipping = ShippingService::new(
            vec![
                Arc::new(DelhiveryCarrier::new(config.delhivery.clone())),
                Arc::new(RapidShypCarrier::new(config.rapidshyp.clone(), tokens)),
            ],
            "delhivery",
        );

        let orders = OrderService::new(db.pool.clone(), notifier.clone());
        let geo = GeoLookup::new(config.geo_api_url.clone());

        Ok(Self {
            config: Arc::new(config.clone()),
            db,
            orders,
            payment,
            shipping,
            geo,
            notifier,
        })
    }

    /// Assemble state from pre-built services (tests inject fakes here)
    pub fn with_services(
        config: Config,
        db: DbService,
        payment: PaymentService,
        shipping: ShippingService,
        notifier: Notifier,
    ) -> Self {
        let orders = OrderService::new(db.pool.clone(), notifier.clone());
        let geo = GeoLookup::new(config.geo_api_url.clone());
        Self {
            config: Arc::new(config),
            db,
            orders,
            payment,
            shipping,
            geo,
            notifier,
        }
    }
}
