use super::use_case::PaginateUseCase;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Paginated models by name. Built once at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<PaginateUseCase>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `use_case` under its model name, replacing any earlier binding.
    pub fn register(&mut self, use_case: PaginateUseCase) {
        let name = use_case.model().name.clone();
        info!(model = %name, "Registered paginated model");
        self.models.insert(name, Arc::new(use_case));
    }

    pub fn get(&self, name: &str) -> Option<Arc<PaginateUseCase>> {
        self.models.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }
}
