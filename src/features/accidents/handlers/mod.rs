mod accident_handler;
mod accident_form_handler;

pub use accident_form_handler::*;
pub use accident_handler::*;

use std::sync::Arc;

use crate::features::accidents::services::{
    ClientNotifier, DispatchService, IntakeService, ReportService,
};

/// State for accident handlers
#[derive(Clone)]
pub struct AccidentState {
    pub reports: Arc<ReportService>,
    pub intake: Arc<IntakeService>,
    pub dispatch: Arc<DispatchService>,
    pub notifier: Arc<ClientNotifier>,
}
