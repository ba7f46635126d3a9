//! In-memory ring for testing and embedding.

use std::sync::Arc;

use crate::data::RingData;
use crate::error::RingResult;
use crate::traits::{RingResolver, RingSource};

/// A ring that never changes.
#[derive(Clone, Debug)]
pub struct StaticRing {
    data: Arc<RingData>,
}

impl StaticRing {
    pub fn new(data: RingData) -> RingResult<Self> {
        data.validate()?;
        Ok(Self {
            data: Arc::new(data),
        })
    }
}

impl RingSource for StaticRing {
    fn reload(&self) -> RingResult<Arc<dyn RingResolver>> {
        Ok(self.data.clone())
    }
}
