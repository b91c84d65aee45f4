pub mod settings;

pub use settings::{
    AppSettings, DatabaseSettings, EmailSettings, JwtSettings, NotifierSettings, Settings,
    TwilioSettings,
};
