//! In-memory injector that records the typed text.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;
use touchkey_core::{HidKeyCode, TouchEvent};

use crate::application::touch_session::{InjectError, KeyInjector};

/// A [`KeyInjector`] that appends each touched key's character to a buffer.
#[derive(Debug, Default)]
pub struct TextBufferInjector {
    text: Mutex<String>,
}

impl TextBufferInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything typed so far.
    pub fn text(&self) -> String {
        match self.text.lock() {
            Ok(text) => text.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl KeyInjector for TextBufferInjector {
    async fn inject(&self, event: &TouchEvent) -> Result<(), InjectError> {
        let usage = event.key.hid_code();
        if usage == HidKeyCode::Unknown {
            return Err(InjectError::Unmapped(event.key.identifier().to_string()));
        }

        info!(
            key = event.key.identifier(),
            usage = format_args!("0x{:02X}", usage.usage_id()),
            confidence = event.confidence,
            "key injected"
        );
        let mut text = self
            .text
            .lock()
            .map_err(|_| InjectError::Backend("text buffer lock poisoned".to_string()))?;
        text.push(event.key.display());
        Ok(())
    }
}
