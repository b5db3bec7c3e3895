//! Component registration macros.
//!
//! These macros replace annotation scanning: each invocation submits a
//! [`ComponentDescriptor`](crate::ComponentDescriptor) to the global
//! collection read by the [`Scanner`](crate::Scanner). Invoke them in the
//! module that defines the type; that module's path is what namespaces match.
//!
//! ```ignore
//! // Controller built with Default
//! sprig_core::controller!(DemoAction);
//!
//! // Controller with a fallible constructor
//! sprig_core::controller!(DemoAction; new = DemoAction::try_new);
//!
//! // Service under its default name, aliased by one contract
//! sprig_core::service!(DemoService: dyn DemoApi);
//!
//! // Service under an explicit name with two contracts
//! sprig_core::service!(DemoService as "demo": dyn DemoApi, dyn Audit; new = DemoService::connect);
//! ```

/// Register a controller
#[macro_export]
macro_rules! controller {
    ($ty:ident $(; new = $ctor:path)?) => {
        const _: () = {
            fn __sprig_factory() -> $crate::Result<$crate::BeanInstance> {
                let instance: $ty = ($crate::__sprig_ctor!($ty $(, $ctor)?))()?;
                ::core::result::Result::Ok($crate::BeanInstance::controller(instance))
            }

            $crate::inventory::submit! {
                $crate::ComponentDescriptor {
                    module_path: ::core::module_path!(),
                    simple_name: ::core::stringify!($ty),
                    role: ::core::option::Option::Some($crate::Role::Controller),
                    name: "",
                    factory: __sprig_factory,
                }
            }
        };
    };
}

/// Register a service, optionally under an explicit name and contracts
#[macro_export]
macro_rules! service {
    ($ty:ident $(as $name:literal)? $(: $($contract:ty),+)? $(; new = $ctor:path)?) => {
        const _: () = {
            fn __sprig_factory() -> $crate::Result<$crate::BeanInstance> {
                let instance: ::std::sync::Arc<$ty> =
                    ::std::sync::Arc::new(($crate::__sprig_ctor!($ty $(, $ctor)?))()?);
                ::core::result::Result::Ok(
                    $crate::BeanInstance::from_arc(instance.clone())
                        $($(.with_contract::<$contract>(instance.clone()))+)?
                )
            }

            $crate::inventory::submit! {
                $crate::ComponentDescriptor {
                    module_path: ::core::module_path!(),
                    simple_name: ::core::stringify!($ty),
                    role: ::core::option::Option::Some($crate::Role::Service),
                    name: $crate::__sprig_name!($($name)?),
                    factory: __sprig_factory,
                }
            }
        };
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sprig_ctor {
    ($ty:ident) => {
        || ::core::result::Result::Ok::<$ty, $crate::Error>(<$ty as ::core::default::Default>::default())
    };
    ($ty:ident, $ctor:path) => {
        $ctor
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sprig_name {
    () => {
        ""
    };
    ($name:literal) => {
        $name
    };
}
