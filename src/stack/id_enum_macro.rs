/// Declares a closed identifier enum with a `Custom(String)` escape hatch.
///
/// Each variant maps to a stable lowercase id (used for serde and lookups) and a
/// display name. Unknown ids deserialize into `Custom` so analysis output from a
/// newer detector table still round-trips.
#[macro_export]
macro_rules! define_id_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $id:literal : $display_name:literal
                $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            Custom(String),
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.id())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from_id(&s))
            }
        }

        impl $enum_name {
            /// Stable lowercase identifier
            pub fn id(&self) -> &str {
                match self {
                    $(
                        Self::$variant => $id,
                    )*
                    Self::Custom(id) => id.as_str(),
                }
            }

            pub fn display_name(&self) -> String {
                match self {
                    $(
                        Self::$variant => $display_name.to_string(),
                    )*
                    Self::Custom(id) => id.clone(),
                }
            }

            /// Case-insensitive lookup by id or alias; unknown ids become `Custom`
            pub fn from_id(id: &str) -> Self {
                let lowered = id.trim().to_lowercase();
                match lowered.as_str() {
                    $(
                        $id $(| $alias)* => Self::$variant,
                    )*
                    _ => Self::Custom(lowered),
                }
            }

            pub fn is_custom(&self) -> bool {
                matches!(self, Self::Custom(_))
            }

            pub fn all_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}
