use crate::client::output::outputs::Output;
use crate::common::config::HorizonConfig;

pub struct GlobalSettings {
    config: HorizonConfig,
    printer: Box<dyn Output>,
}

impl GlobalSettings {
    pub fn new(config: HorizonConfig, printer: Box<dyn Output>) -> Self {
        GlobalSettings { config, printer }
    }

    pub fn config(&self) -> &HorizonConfig {
        &self.config
    }

    pub fn printer(&self) -> &dyn Output {
        self.printer.as_ref()
    }
}
