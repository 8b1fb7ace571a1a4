//! Utility functions for the bean factory
//!
//! Creation tracking and `depends-on` graph analysis used by
//! [`DefaultListableBeanFactory`](crate::bean_factory::DefaultListableBeanFactory).

/// Dependency resolution utilities
pub mod dependency {
    use std::collections::{HashMap, HashSet};
    use std::thread::{self, ThreadId};

    use parking_lot::Mutex;
    use thiserror::Error;

    /// Tracks beans currently being created to detect re-entrant creation.
    ///
    /// Creation chains are kept per thread: two threads building the same
    /// prototype concurrently is fine, while a single thread asking for a bean
    /// it is already building is a cycle.
    #[derive(Debug, Default)]
    pub struct CreationTracker {
        creating: Mutex<HashMap<ThreadId, Vec<String>>>,
    }

    impl CreationTracker {
        /// Creates a new empty creation tracker.
        pub fn new() -> Self {
            Self::default()
        }

        /// Checks if the current thread is creating `name`.
        pub fn is_creating(&self, name: &str) -> bool {
            self.creating
                .lock()
                .get(&thread::current().id())
                .is_some_and(|chain| chain.iter().any(|n| n == name))
        }

        /// Marks a bean as being created by the current thread.
        ///
        /// The returned guard clears the mark when dropped. If the bean is
        /// already being created on this thread, returns the creation chain
        /// ending with `name`.
        pub fn start_creating(&self, name: &str) -> Result<CreationGuard<'_>, Vec<String>> {
            let mut creating = self.creating.lock();
            let chain = creating.entry(thread::current().id()).or_default();
            if chain.iter().any(|n| n == name) {
                let mut cycle = chain.clone();
                cycle.push(name.to_string());
                return Err(cycle);
            }
            chain.push(name.to_string());
            Ok(CreationGuard {
                tracker: self,
                name: name.to_string(),
            })
        }

        fn finish_creating(&self, name: &str) {
            let id = thread::current().id();
            let mut creating = self.creating.lock();
            if let Some(chain) = creating.get_mut(&id) {
                if let Some(pos) = chain.iter().rposition(|n| n == name) {
                    chain.remove(pos);
                }
                if chain.is_empty() {
                    creating.remove(&id);
                }
            }
        }

        /// Snapshot of the current thread's creation chain, outermost first.
        pub fn current_creating(&self) -> Vec<String> {
            self.creating
                .lock()
                .get(&thread::current().id())
                .cloned()
                .unwrap_or_default()
        }
    }

    /// Clears a creation mark on drop, including on early return and unwinding.
    #[derive(Debug)]
    pub struct CreationGuard<'a> {
        tracker: &'a CreationTracker,
        name: String,
    }

    impl Drop for CreationGuard<'_> {
        fn drop(&mut self) {
            self.tracker.finish_creating(&self.name);
        }
    }

    /// Dependency graph analysis result
    #[derive(Debug, Error)]
    pub enum DependencyValidationError {
        /// Circular dependency detected
        #[error("Circular depends-on relationship: {}", .cycle.join(" -> "))]
        CircularDependency {
            /// The dependency chain forming the cycle
            cycle: Vec<String>,
        },
        /// Missing dependency detected
        #[error("Bean '{bean}' depends on '{missing}' which is not registered")]
        MissingDependency {
            /// The bean that requires the dependency
            bean: String,
            /// The missing dependency
            missing: String,
        },
    }

    /// Validates a dependency graph for cycles and missing beans
    ///
    /// # Arguments
    ///
    /// * `dependencies` - Map of bean name to the names it depends on
    ///
    /// # Returns
    ///
    /// Returns Ok(()) if no issues found, or Err with the first detected issue.
    /// Beans are visited in sorted order so the reported issue is stable.
    pub fn validate_dependency_graph(
        dependencies: &HashMap<String, Vec<String>>,
    ) -> Result<(), DependencyValidationError> {
        let mut names: Vec<&String> = dependencies.keys().collect();
        names.sort();

        for bean_name in &names {
            for dep in &dependencies[*bean_name] {
                if !dependencies.contains_key(dep) {
                    return Err(DependencyValidationError::MissingDependency {
                        bean: (*bean_name).clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }

        let mut visited = HashSet::new();
        let mut rec_stack = Vec::new();

        for bean_name in names {
            if !visited.contains(bean_name) {
                if let Some(cycle) =
                    detect_cycle_dfs(bean_name, dependencies, &mut visited, &mut rec_stack)
                {
                    return Err(DependencyValidationError::CircularDependency { cycle });
                }
            }
        }

        Ok(())
    }

    /// DFS-based cycle detection
    fn detect_cycle_dfs(
        node: &str,
        graph: &HashMap<String, Vec<String>>,
        visited: &mut HashSet<String>,
        rec_stack: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        visited.insert(node.to_string());
        rec_stack.push(node.to_string());

        if let Some(deps) = graph.get(node) {
            for dep in deps {
                if let Some(start) = rec_stack.iter().position(|x| x == dep) {
                    let mut cycle = rec_stack[start..].to_vec();
                    cycle.push(dep.to_string());
                    return Some(cycle);
                }
                if !visited.contains(dep) {
                    if let Some(cycle) = detect_cycle_dfs(dep, graph, visited, rec_stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        rec_stack.pop();
        None
    }
}
