//! Module registration and dependency ordering

use crate::error::EtkError;
use crate::module::ExtractionModule;
use crate::resources::Resources;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

type ModuleFactory =
    Box<dyn FnOnce(&Resources) -> Result<Box<dyn ExtractionModule>, EtkError> + Send>;

/// Explicit list of modules to load into an engine
///
/// Modules are either registered as ready instances or as constructors that
/// receive the engine's shared [`Resources`]. Nothing is instantiated until
/// [`ModuleRegistry::load`].
#[derive(Default)]
pub struct ModuleRegistry {
    factories: Vec<ModuleFactory>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready module instance
    pub fn register<M>(&mut self, module: M) -> &mut Self
    where
        M: ExtractionModule + 'static,
    {
        self.factories
            .push(Box::new(move |_| Ok(Box::new(module) as Box<dyn ExtractionModule>)));
        self
    }

    /// Register a constructor that receives the shared resources
    pub fn register_with<F, M>(&mut self, constructor: F) -> &mut Self
    where
        F: FnOnce(&Resources) -> Result<M, EtkError> + Send + 'static,
        M: ExtractionModule + 'static,
    {
        self.factories.push(Box::new(move |resources| {
            constructor(resources).map(|m| Box::new(m) as Box<dyn ExtractionModule>)
        }));
        self
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate every module and sort them by dependencies
    ///
    /// Fails when nothing is registered, when any constructor fails, or when
    /// the dependency declarations cannot be ordered.
    pub fn load(self, resources: &Resources) -> Result<Vec<Box<dyn ExtractionModule>>, EtkError> {
        if self.factories.is_empty() {
            return Err(EtkError::ModuleLoad(
                "No extraction modules registered".to_string(),
            ));
        }

        let mut modules = Vec::with_capacity(self.factories.len());
        for (idx, factory) in self.factories.into_iter().enumerate() {
            let module = factory(resources).map_err(|e| {
                EtkError::ModuleLoad(format!("Failed to instantiate module #{}: {}", idx, e))
            })?;
            debug!("Instantiated module '{}'", module.name());
            modules.push(module);
        }

        let modules = topological_sort(modules)?;
        info!(
            "Loaded {} extraction modules: {}",
            modules.len(),
            modules.iter().map(|m| m.name()).collect::<Vec<_>>().join(" -> ")
        );
        Ok(modules)
    }
}

/// Order modules so every module runs after the modules it depends on
///
/// Ties are broken by registration order, so modules without dependencies
/// keep the order they were registered in.
pub fn topological_sort(
    modules: Vec<Box<dyn ExtractionModule>>,
) -> Result<Vec<Box<dyn ExtractionModule>>, EtkError> {
    let order = dependency_order(&modules)?;
    let mut slots: Vec<Option<Box<dyn ExtractionModule>>> = modules.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|idx| slots[idx].take()).collect())
}

fn dependency_order(modules: &[Box<dyn ExtractionModule>]) -> Result<Vec<usize>, EtkError> {
    let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(modules.len());
    for (idx, module) in modules.iter().enumerate() {
        if by_name.insert(module.name(), idx).is_some() {
            return Err(EtkError::ModuleLoad(format!(
                "Duplicate module name '{}'",
                module.name()
            )));
        }
    }

    let mut in_degree = vec![0usize; modules.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); modules.len()];
    for (idx, module) in modules.iter().enumerate() {
        for dependency in module.depends_on() {
            let &dep_idx = by_name.get(dependency).ok_or_else(|| {
                EtkError::ModuleLoad(format!(
                    "Module '{}' depends on unknown module '{}'",
                    module.name(),
                    dependency
                ))
            })?;
            dependents[dep_idx].push(idx);
            in_degree[idx] += 1;
        }
    }

    // Kahn's algorithm; the ready set is ordered by registration index
    let mut ready: BTreeSet<usize> = (0..modules.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(modules.len());
    while let Some(idx) = ready.pop_first() {
        order.push(idx);
        for &dependent in &dependents[idx] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < modules.len() {
        let stuck: Vec<&str> = (0..modules.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| modules[i].name())
            .collect();
        return Err(EtkError::ModuleLoad(format!(
            "Dependency cycle among modules: {}",
            stuck.join(", ")
        )));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::module::Issue;

    struct Named {
        name: &'static str,
        deps: Vec<&'static str>,
    }

    impl Named {
        fn boxed(name: &'static str, deps: &[&'static str]) -> Box<dyn ExtractionModule> {
            Box::new(Named {
                name,
                deps: deps.to_vec(),
            })
        }
    }

    impl ExtractionModule for Named {
        fn name(&self) -> &str {
            self.name
        }

        fn depends_on(&self) -> &[&str] {
            &self.deps
        }

        fn document_selector(&self, _doc: &Document) -> bool {
            true
        }

        fn process_document(&self, _doc: &mut Document) -> Result<Vec<Issue>, EtkError> {
            Ok(Vec::new())
        }
    }

    fn names(modules: &[Box<dyn ExtractionModule>]) -> Vec<&str> {
        modules.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn test_no_dependencies_keeps_registration_order() {
        let sorted = topological_sort(vec![
            Named::boxed("c", &[]),
            Named::boxed("a", &[]),
            Named::boxed("b", &[]),
        ])
        .unwrap();
        assert_eq!(names(&sorted), ["c", "a", "b"]);
    }

    #[test]
    fn test_dependent_runs_after_dependency() {
        let sorted = topological_sort(vec![
            Named::boxed("aggregate", &["members"]),
            Named::boxed("members", &[]),
        ])
        .unwrap();
        assert_eq!(names(&sorted), ["members", "aggregate"]);
    }

    #[test]
    fn test_diamond_is_stable() {
        let sorted = topological_sort(vec![
            Named::boxed("d", &["b", "c"]),
            Named::boxed("c", &["a"]),
            Named::boxed("b", &["a"]),
            Named::boxed("a", &[]),
            Named::boxed("e", &[]),
        ])
        .unwrap();
        assert_eq!(names(&sorted), ["a", "c", "b", "d", "e"]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = topological_sort(vec![
            Named::boxed("free", &[]),
            Named::boxed("x", &["y"]),
            Named::boxed("y", &["x"]),
        ]);
        match result {
            Err(EtkError::ModuleLoad(msg)) => {
                assert!(msg.contains("cycle"));
                assert!(msg.contains('x') && msg.contains('y'));
                assert!(!msg.contains("free"));
            }
            _ => panic!("expected a cycle error"),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        assert!(topological_sort(vec![Named::boxed("x", &["x"])]).is_err());
    }

    #[test]
    fn test_unknown_dependency_is_rejected() {
        let result = topological_sort(vec![Named::boxed("x", &["ghost"])]);
        assert!(matches!(result, Err(EtkError::ModuleLoad(msg)) if msg.contains("ghost")));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = topological_sort(vec![Named::boxed("x", &[]), Named::boxed("x", &[])]);
        assert!(matches!(result, Err(EtkError::ModuleLoad(_))));
    }

    #[test]
    fn test_empty_registry_fails_to_load() {
        let result = ModuleRegistry::new().load(&Resources::default());
        assert!(matches!(result, Err(EtkError::ModuleLoad(msg)) if msg.contains("No extraction modules")));
    }

    #[test]
    fn test_failing_constructor_fails_load() {
        let mut registry = ModuleRegistry::new();
        registry.register(Named { name: "ok", deps: vec![] });
        registry.register_with(|_| -> Result<Named, EtkError> {
            Err(EtkError::Config("missing glossary".to_string()))
        });
        let result = registry.load(&Resources::default());
        assert!(matches!(result, Err(EtkError::ModuleLoad(msg)) if msg.contains("#1")));
    }
}
