#[macro_export]
macro_rules! register_functions {
    ( $registry:expr; $($fn:path),+ $(,)? ) => {{
        use std::sync::Arc;
        $(
            $crate::function_registry::FunctionRegistry::register($registry, Arc::new($fn));
        )+
    }};
}
