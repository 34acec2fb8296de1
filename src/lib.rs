pub mod config;
pub mod services {
    pub mod indicators;
    pub mod market_context;
    pub mod market_data;
    pub mod notifier;
    pub mod scanner;

    pub mod strategies;
}

pub mod utils {
    pub mod errors;
}
