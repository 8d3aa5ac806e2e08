//! Identity objects — a user's provider-backed identity and profile.

use serde_json::{json, Map, Value};

use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_str, require_str, ObjectCore, SerializedFormError, TypeTag, UorObject,
};
use crate::prime::DecompositionBuilder;

/// Profile fields counted toward identity completeness.
const PROFILE_FIELD_COUNT: f64 = 5.0;

/// An identity rooted at an external provider account.
///
/// Coherence weights: provider verification is worth up to 0.5, profile
/// completeness (display name, avatar, bio, location, email) the other 0.5.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    core: ObjectCore,
    provider: String,
    provider_login: String,
    verified: bool,
    display_name: Option<String>,
    avatar_url: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    email: Option<String>,
}

impl Identity {
    /// Creates an unverified identity for a provider account.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        provider: impl Into<String>,
        provider_login: impl Into<String>,
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::identity()),
            provider: provider.into(),
            provider_login: provider_login.into(),
            verified: false,
            display_name: None,
            avatar_url: None,
            bio: None,
            location: None,
            email: None,
        }
    }

    /// Marks the identity as provider-verified.
    #[must_use]
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Attaches a display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Attaches an avatar URL.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Attaches a short bio.
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Attaches a location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attaches an email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The provider name (e.g. `github`).
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The account login at the provider.
    #[must_use]
    pub fn provider_login(&self) -> &str {
        &self.provider_login
    }

    /// Whether the provider has verified this identity.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Updates the bio and invalidates the computed forms.
    pub fn set_bio(&mut self, bio: impl Into<String>) {
        self.bio = Some(bio.into());
        self.core.touch();
    }

    /// Number of filled profile fields.
    fn profile_fields_filled(&self) -> usize {
        [
            &self.display_name,
            &self.avatar_url,
            &self.bio,
            &self.location,
            &self.email,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }

    /// Reconstructs an identity from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag, missing
    /// provider fields, or mistyped fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::identity())?;
        let verified = data.get("verified").and_then(Value::as_bool).unwrap_or(false);
        Ok(Self {
            core,
            provider: require_str(&data, "provider")?.to_owned(),
            provider_login: require_str(&data, "providerLogin")?.to_owned(),
            verified,
            display_name: optional_str(&data, "displayName")?,
            avatar_url: optional_str(&data, "avatarUrl")?,
            bio: optional_str(&data, "bio")?,
            location: optional_str(&data, "location")?,
            email: optional_str(&data, "email")?,
        })
    }
}

impl UorObject for Identity {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("provider".to_owned(), json!(self.provider));
        data.insert("providerLogin".to_owned(), json!(self.provider_login));
        data.insert("verified".to_owned(), json!(self.verified));
        if let Some(display_name) = &self.display_name {
            data.insert("displayName".to_owned(), json!(display_name));
        }
        if let Some(avatar_url) = &self.avatar_url {
            data.insert("avatarUrl".to_owned(), json!(avatar_url));
        }
        if let Some(bio) = &self.bio {
            data.insert("bio".to_owned(), json!(bio));
        }
        if let Some(location) = &self.location {
            data.insert("location".to_owned(), json!(location));
        }
        if let Some(email) = &self.email {
            data.insert("email".to_owned(), json!(email));
        }
        Value::Object(data)
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("provider", &json!(self.provider))
            .attribute("providerLogin", &json!(self.provider_login))
            .attribute("displayName", &json!(self.display_name))
            .attribute("email", &json!(self.email));
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        let profile_fraction = self.profile_fields_filled() as f64 / PROFILE_FIELD_COUNT;
        CoherenceScore::new()
            .credit(0.5, self.verified)
            .partial(0.5, profile_fraction)
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.provider.is_empty() && !self.provider_login.is_empty()
    }
}
