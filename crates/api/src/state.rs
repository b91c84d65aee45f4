use foodwise_config::Settings;
use foodwise_services::{
    AuthService,
    dao::{item::ItemDao, user::UserDao},
    notify::{Dispatcher, ExpirySweep},
};
use mongodb::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub items: Arc<ItemDao>,
    pub dispatcher: Arc<Dispatcher>,
    pub sweep: Arc<ExpirySweep>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(&settings.jwt));
        let users = Arc::new(UserDao::new(&db));
        let items = Arc::new(ItemDao::new(&db));

        // One shared provider client set, constructed here and injected
        let dispatcher = Arc::new(Dispatcher::from_settings(
            &settings.twilio,
            &settings.email,
            settings.notifier.default_country_code.clone(),
        ));
        let sweep = Arc::new(ExpirySweep::new(
            users.clone(),
            items.clone(),
            dispatcher.clone(),
            settings.notifier.default_reminder_days,
        ));

        Self {
            db,
            settings,
            auth,
            users,
            items,
            dispatcher,
            sweep,
        }
    }
}
