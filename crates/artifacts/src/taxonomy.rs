// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Data taxonomy for credentials in store configuration.
//!
//! Each classified field holds a `data_privacy::Sensitive` value tagged with a
//! class from [`DashdataTaxonomy`]. Values pass through serde unchanged, so
//! configuration files round-trip, but `Debug` and `Display` print
//! `<dashdata/<class>:REDACTED>`. Use `.as_declassified()` where the real value
//! is needed, e.g. when building the S3 client.
//!
//! ```rust
//! use artifacts::taxonomy::ApiSecret;
//!
//! let secret = ApiSecret::new("wJalrXUtnFEMI".to_string());
//! assert!(!format!("{secret:?}").contains("wJalr"));
//! assert_eq!(secret.as_declassified(), "wJalrXUtnFEMI");
//! ```

use data_privacy::{Classified, DataClass, Sensitive, taxonomy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Data classes for sensitive configuration fields
#[taxonomy(dashdata)]
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum DashdataTaxonomy {
    /// Access key identifiers
    ApiKey,

    /// Secret access keys
    ApiSecret,

    /// Endpoints that reveal infrastructure details
    ServiceEndpoint,
}

/// Type-level selector of a [`DashdataTaxonomy`] class
pub trait ClassMarker {
    fn class() -> DashdataTaxonomy;
}

#[derive(Debug)]
pub enum ApiKeyClass {}

#[derive(Debug)]
pub enum ApiSecretClass {}

#[derive(Debug)]
pub enum ServiceEndpointClass {}

impl ClassMarker for ApiKeyClass {
    fn class() -> DashdataTaxonomy {
        DashdataTaxonomy::ApiKey
    }
}

impl ClassMarker for ApiSecretClass {
    fn class() -> DashdataTaxonomy {
        DashdataTaxonomy::ApiSecret
    }
}

impl ClassMarker for ServiceEndpointClass {
    fn class() -> DashdataTaxonomy {
        DashdataTaxonomy::ServiceEndpoint
    }
}

pub type ApiKey<T> = ClassifiedField<ApiKeyClass, T>;
pub type ApiSecret<T> = ClassifiedField<ApiSecretClass, T>;
pub type ServiceEndpoint<T> = ClassifiedField<ServiceEndpointClass, T>;

/// A configuration value classified as `C`
pub struct ClassifiedField<C, T> {
    value: Sensitive<T>,
    class: PhantomData<fn() -> C>,
}

impl<C: ClassMarker, T> ClassifiedField<C, T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Sensitive::new(value, C::class()),
            class: PhantomData,
        }
    }
}

impl<C, T> ClassifiedField<C, T> {
    pub fn as_declassified(&self) -> &T {
        self.value.declassify_ref()
    }

    pub fn declassify(self) -> T {
        self.value.declassify_into()
    }

    /// The underlying container, for use with a `data_privacy::RedactionEngine`
    pub fn as_sensitive(&self) -> &Sensitive<T> {
        &self.value
    }

    pub fn data_class(&self) -> &DataClass {
        self.value.data_class()
    }

    fn write_redacted(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.data_class();
        write!(f, "<{}/{}:REDACTED>", class.taxonomy(), class.name())
    }
}

impl<C, T: Clone> Clone for ClassifiedField<C, T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            class: PhantomData,
        }
    }
}

impl<C, T: PartialEq> PartialEq for ClassifiedField<C, T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<C, T: Eq> Eq for ClassifiedField<C, T> {}

impl<C: ClassMarker, T: Default> Default for ClassifiedField<C, T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<C, T> fmt::Debug for ClassifiedField<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_redacted(f)
    }
}

impl<C, T> fmt::Display for ClassifiedField<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_redacted(f)
    }
}

impl<C, T: Serialize> Serialize for ClassifiedField<C, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_declassified().serialize(serializer)
    }
}

impl<'de, C: ClassMarker, T: Deserialize<'de>> Deserialize<'de> for ClassifiedField<C, T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::new)
    }
}
