//! Shared state for the trigger endpoints

use std::sync::Arc;

use crate::engine::Engine;

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<Engine>,
}

impl ApiState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}
