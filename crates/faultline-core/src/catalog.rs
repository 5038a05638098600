//! Registry of pre-built error values
//!
//! Every known failure condition is a [`Sentinel`] with a fixed display code.
//! Codes are part of the wire contract: clients match on them, so a code is
//! never reused for a different condition within its [`Band`].
//!
//! The registry is an ordinary value. Build it once at startup with
//! [`Catalog::standard`] and hand it to whoever needs it; nothing mutates it
//! afterwards.

use std::error::Error as StdError;
use std::ops::RangeInclusive;

use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};

use crate::{Error, GatewayTable, Level, Translator};

/// Named catalog entry
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sentinel {
    // gateway band
    Unknown,
    InvalidParam,
    Unauthorized,
    Unauthenticated,
    MySql,
    MongoDb,
    RpcFailed,
    RequestParams,
    ObjectStorage,
    GrpcInterceptor,
    // common band
    UnknownException,
    DbOperation,
    InternalServer,
    IllegalArgument,
    ServerBusy,
    Forbidden,
    InvalidSession,
    LoginRequired,
    NotSupportedAuthorization,
    InvalidAuthorizationCode,
    InvalidAccessToken,
    InvalidToken,
    TokenRequired,
    UserInactive,
    IncorrectUsernameOrPassword,
    ResourceNotFound,
    ResourceAlreadyExists,
    ResourceSingular,
    ResourceNotLoaded,
    ResourceConstraint,
    TaskQueueFull,
    ExternalService,
    Rejected,
    // user bounded context
    InvalidAuthenticationCode,
    RequiredAuthenticationCode,
    InvalidAuthenticationState,
    UnsupportedAuthenticationMethod,
    OAuth2AuthorizationFailed,
    OAuth2UserInfoFailed,
    UserDisabled,
    InvalidCaptcha,
    InvalidUsernameOrPassword,
}

impl Sentinel {
    /// This sentinel's line in [`STANDARD`]
    pub fn standard_entry(self) -> &'static Entry {
        &STANDARD[self as usize]
    }

    /// Fresh value built from the standard line, for code that has no
    /// [`Catalog`] at hand
    pub fn standard_error(self) -> Error {
        self.standard_entry().build()
    }
}

/// Which part of the system a sentinel reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Domain {
    System,
    Auth,
    Resource,
    Business,
}

/// Numeric range a sentinel's code must fall in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Band {
    /// Infrastructure codes, some of which are remapped at the gateway
    System,
    /// Shared service codes
    Common,
    /// Reserved for the user bounded context
    User,
}

impl Band {
    pub const fn range(self) -> RangeInclusive<i32> {
        match self {
            Self::System => 10_000..=19_999,
            Self::Common => 20_000..=29_999,
            Self::User => 60_010_000..=60_019_999,
        }
    }

    pub fn contains(self, code: i32) -> bool {
        self.range().contains(&code)
    }
}

/// Static description of one sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub sentinel: Sentinel,
    pub code: i32,
    pub reason: &'static str,
    pub level: Level,
    pub domain: Domain,
    pub band: Band,
}

impl Entry {
    const fn new(sentinel: Sentinel, code: i32, reason: &'static str, level: Level, domain: Domain, band: Band) -> Self {
        Self {
            sentinel,
            code,
            reason,
            level,
            domain,
            band,
        }
    }

    fn build(&self) -> Error {
        Error::new(self.code, self.reason, self.level)
    }
}

/// The standard catalog, one line per sentinel in declaration order
pub const STANDARD: &[Entry] = {
    use Band::{Common, System as SystemBand, User};
    use Domain::{Auth, Business, Resource, System};
    use Level::{Error, Info, Warning};
    use Sentinel as S;

    &[
        Entry::new(S::Unknown, 10000, "an unknown error occurred", Error, System, SystemBand),
        Entry::new(S::InvalidParam, 10001, "invalid parameter", Info, System, SystemBand),
        Entry::new(S::Unauthorized, 10105, "unauthorized user", Info, Auth, SystemBand),
        Entry::new(S::Unauthenticated, 10106, "unauthenticated request", Info, Auth, SystemBand),
        Entry::new(S::MySql, 11001, "database error", Error, System, SystemBand),
        Entry::new(S::MongoDb, 12001, "MongoDB error", Error, System, SystemBand),
        Entry::new(S::RpcFailed, 14001, "RPC call failed", Error, System, SystemBand),
        Entry::new(S::RequestParams, 15001, "invalid request parameters", Info, System, SystemBand),
        Entry::new(S::ObjectStorage, 16001, "object storage service error", Error, System, SystemBand),
        Entry::new(S::GrpcInterceptor, 17001, "gRPC interceptor error", Error, System, SystemBand),
        Entry::new(S::UnknownException, 20000, "encountered an unknown error", Error, System, Common),
        Entry::new(S::DbOperation, 20001, "database operation failed", Error, System, Common),
        Entry::new(S::InternalServer, 20002, "internal server error", Error, System, Common),
        Entry::new(S::IllegalArgument, 20003, "invalid request argument", Info, System, Common),
        Entry::new(S::ServerBusy, 20004, "server busy, please retry later", Error, System, Common),
        Entry::new(S::Forbidden, 20005, "access forbidden", Info, Auth, Common),
        Entry::new(S::InvalidSession, 20008, "invalid session", Info, Auth, Common),
        Entry::new(S::LoginRequired, 20100, "login required", Info, Auth, Common),
        Entry::new(S::NotSupportedAuthorization, 20101, "unsupported authorization type", Info, Auth, Common),
        Entry::new(S::InvalidAuthorizationCode, 20102, "authorization code has expired", Info, Auth, Common),
        Entry::new(S::InvalidAccessToken, 20104, "invalid access token", Info, Auth, Common),
        Entry::new(S::InvalidToken, 20105, "invalid token", Info, Auth, Common),
        Entry::new(S::TokenRequired, 20106, "token required", Info, Auth, Common),
        Entry::new(S::UserInactive, 20200, "your account has been disabled", Info, Auth, Common),
        Entry::new(S::IncorrectUsernameOrPassword, 20201, "incorrect username or password", Info, Auth, Common),
        Entry::new(S::ResourceNotFound, 20300, "resource not found", Info, Resource, Common),
        Entry::new(S::ResourceAlreadyExists, 20301, "resource already exists", Info, Resource, Common),
        Entry::new(S::ResourceSingular, 20302, "resource is not unique", Info, Resource, Common),
        Entry::new(S::ResourceNotLoaded, 20303, "resource is not loaded", Info, Resource, Common),
        Entry::new(S::ResourceConstraint, 20304, "resource constraint violated", Info, Resource, Common),
        Entry::new(S::TaskQueueFull, 20305, "task queue is full", Warning, Resource, Common),
        Entry::new(S::ExternalService, 20400, "external service error", Error, System, Common),
        Entry::new(S::Rejected, 20500, "request rejected", Info, System, Common),
        Entry::new(S::InvalidAuthenticationCode, 60_010_001, "credential is invalid or expired", Info, Business, User),
        Entry::new(S::RequiredAuthenticationCode, 60_010_002, "credential must not be empty", Info, Business, User),
        Entry::new(S::InvalidAuthenticationState, 60_010_003, "invalid authorization state", Info, Business, User),
        Entry::new(S::UnsupportedAuthenticationMethod, 60_010_004, "unsupported authorization method", Info, Business, User),
        Entry::new(S::OAuth2AuthorizationFailed, 60_010_005, "OAuth2 authorization failed", Warning, Business, User),
        Entry::new(S::OAuth2UserInfoFailed, 60_010_006, "failed to fetch OAuth2 user info", Warning, Business, User),
        Entry::new(S::UserDisabled, 60_010_011, "user is disabled", Info, Business, User),
        Entry::new(S::InvalidCaptcha, 60_010_012, "invalid captcha", Info, Business, User),
        Entry::new(S::InvalidUsernameOrPassword, 60_010_013, "invalid username or password", Info, Business, User),
    ]
};

/// Reasons a set of entries cannot form a catalog
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("sentinel {sentinel} has code {code}, outside the {band} band")]
    OutOfBand { sentinel: Sentinel, code: i32, band: Band },

    #[error("code {code} is claimed by both {first} and {second}")]
    DuplicateCode { code: i32, first: Sentinel, second: Sentinel },

    #[error("sentinel {0} is registered more than once")]
    DuplicateSentinel(Sentinel),

    #[error("sentinel {0} is missing")]
    Missing(Sentinel),
}

/// Read-only registry of sentinels
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Indexed by sentinel discriminant
    slots: Vec<(Entry, Error)>,
    /// Slot indices sorted by code
    code_order: Vec<usize>,
}

impl Catalog {
    /// The fixed standard catalog
    pub fn standard() -> Self {
        Self::assemble(STANDARD)
    }

    /// Build a catalog after checking bands, uniqueness and completeness
    pub fn from_entries(entries: &[Entry]) -> Result<Self, CatalogError> {
        let mut seen: Vec<Option<&Entry>> = vec![None; Sentinel::COUNT];

        for entry in entries {
            if !entry.band.contains(entry.code) {
                return Err(CatalogError::OutOfBand {
                    sentinel: entry.sentinel,
                    code: entry.code,
                    band: entry.band,
                });
            }

            if let Some(first) = seen.iter().flatten().find(|other| other.code == entry.code) {
                return Err(CatalogError::DuplicateCode {
                    code: entry.code,
                    first: first.sentinel,
                    second: entry.sentinel,
                });
            }

            let slot = &mut seen[entry.sentinel as usize];
            if slot.is_some() {
                return Err(CatalogError::DuplicateSentinel(entry.sentinel));
            }
            *slot = Some(entry);
        }

        if let Some(missing) = Sentinel::iter().find(|sentinel| seen[*sentinel as usize].is_none()) {
            return Err(CatalogError::Missing(missing));
        }

        Ok(Self::assemble(entries))
    }

    fn assemble(entries: &[Entry]) -> Self {
        let mut sorted = entries.to_vec();
        sorted.sort_by_key(|entry| entry.sentinel);

        let slots: Vec<(Entry, Error)> = sorted.into_iter().map(|entry| (entry, entry.build())).collect();

        let mut code_order: Vec<usize> = (0..slots.len()).collect();
        code_order.sort_by_key(|&index| slots[index].0.code);

        Self { slots, code_order }
    }

    /// The pre-built value for `sentinel`
    pub fn get(&self, sentinel: Sentinel) -> &Error {
        &self.slots[sentinel as usize].1
    }

    pub fn entry(&self, sentinel: Sentinel) -> &Entry {
        &self.slots[sentinel as usize].0
    }

    /// Look a sentinel up by its display code
    pub fn by_code(&self, code: i32) -> Option<(&Entry, &Error)> {
        self.code_order
            .binary_search_by_key(&code, |&index| self.slots[index].0.code)
            .ok()
            .map(|position| {
                let (entry, error) = &self.slots[self.code_order[position]];
                (entry, error)
            })
    }

    /// All sentinels in ascending code order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Entry, &Error)> + '_ {
        self.code_order.iter().map(|&index| {
            let (entry, error) = &self.slots[index];
            (entry, error)
        })
    }

    /// Sentinels of one domain, in ascending code order
    pub fn domain(&self, domain: Domain) -> impl Iterator<Item = (&Entry, &Error)> + '_ {
        self.iter().filter(move |(entry, _)| entry.domain == domain)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Translator that falls back to [`Sentinel::Unknown`] and applies the
    /// web gateway table
    pub fn translator(&self) -> Translator {
        Translator::new(self.get(Sentinel::Unknown).clone(), GatewayTable::web())
    }

    /// Wrap a downstream failure into `sentinel`, keeping its text as message
    pub fn wrap_with<E>(&self, sentinel: Sentinel, cause: E) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        self.get(sentinel).with_wrap(Some(cause))
    }

    pub fn mysql<E>(&self, cause: E) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        self.wrap_with(Sentinel::MySql, cause)
    }

    pub fn mongodb<E>(&self, cause: E) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        self.wrap_with(Sentinel::MongoDb, cause)
    }

    pub fn rpc_failed<E>(&self, cause: E) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        self.wrap_with(Sentinel::RpcFailed, cause)
    }

    pub fn object_storage<E>(&self, cause: E) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        self.wrap_with(Sentinel::ObjectStorage, cause)
    }

    pub fn invalid_param<E>(&self, cause: E) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        self.wrap_with(Sentinel::InvalidParam, cause)
    }

    pub fn unknown<E>(&self, cause: E) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        self.wrap_with(Sentinel::Unknown, cause)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{ProtocolCode, chain};

    #[test]
    fn standard_entries_are_valid() {
        let catalog = Catalog::from_entries(STANDARD).unwrap();
        assert_eq!(catalog.len(), Sentinel::COUNT);
    }

    #[test]
    fn standard_table_follows_declaration_order() {
        for sentinel in Sentinel::iter() {
            assert_eq!(sentinel.standard_entry().sentinel, sentinel);
        }
        assert_eq!(Sentinel::IllegalArgument.standard_error().code(), 20003);
    }

    #[test]
    fn every_sentinel_resolves_to_its_entry() {
        let catalog = Catalog::standard();
        for sentinel in Sentinel::iter() {
            let entry = catalog.entry(sentinel);
            let error = catalog.get(sentinel);
            assert_eq!(entry.sentinel, sentinel);
            assert_eq!(error.code(), entry.code);
            assert_eq!(error.reason(), entry.reason);
            assert_eq!(error.level(), entry.level);
            assert_eq!(error.protocol_code(), ProtocolCode::from_display(entry.code));
            assert!(error.cause().is_none());
        }
    }

    #[test]
    fn lookup_by_code() {
        let catalog = Catalog::standard();
        let (entry, error) = catalog.by_code(20300).unwrap();
        assert_eq!(entry.sentinel, Sentinel::ResourceNotFound);
        assert_eq!(error.reason(), "resource not found");
        assert!(catalog.by_code(20006).is_none());
    }

    #[test]
    fn iterates_in_code_order() {
        let catalog = Catalog::standard();
        let codes: Vec<i32> = catalog.iter().map(|(entry, _)| entry.code).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
        assert_eq!(codes.first(), Some(&10000));
        assert_eq!(codes.last(), Some(&60_010_013));
    }

    #[test]
    fn domains_partition_the_catalog() {
        let catalog = Catalog::standard();
        let total: usize = Domain::iter().map(|domain| catalog.domain(domain).count()).sum();
        assert_eq!(total, catalog.len());
        assert!(
            catalog
                .domain(Domain::Business)
                .all(|(entry, _)| entry.band == Band::User)
        );
    }

    #[test]
    fn sentinel_names_round_trip() {
        assert_eq!(Sentinel::ResourceNotFound.to_string(), "resource_not_found");
        assert_eq!("my_sql".parse::<Sentinel>().unwrap(), Sentinel::MySql);
    }

    #[test]
    fn rejects_out_of_band_codes() {
        let mut entries = STANDARD.to_vec();
        entries[0].code = 20_000_000;
        assert_eq!(
            Catalog::from_entries(&entries).unwrap_err(),
            CatalogError::OutOfBand {
                sentinel: Sentinel::Unknown,
                code: 20_000_000,
                band: Band::System,
            }
        );
    }

    #[test]
    fn rejects_duplicate_codes() {
        let mut entries = STANDARD.to_vec();
        entries[1].code = 10000;
        assert_eq!(
            Catalog::from_entries(&entries).unwrap_err(),
            CatalogError::DuplicateCode {
                code: 10000,
                first: Sentinel::Unknown,
                second: Sentinel::InvalidParam,
            }
        );
    }

    #[test]
    fn rejects_missing_and_repeated_sentinels() {
        let missing = &STANDARD[1..];
        assert_eq!(
            Catalog::from_entries(missing).unwrap_err(),
            CatalogError::Missing(Sentinel::Unknown)
        );

        let mut repeated = STANDARD.to_vec();
        let mut twin = repeated[0];
        twin.code = 19_999;
        repeated.push(twin);
        assert_eq!(
            Catalog::from_entries(&repeated).unwrap_err(),
            CatalogError::DuplicateSentinel(Sentinel::Unknown)
        );
    }

    #[test]
    fn adapters_wrap_into_matching_sentinel() {
        let catalog = Catalog::standard();
        let err = catalog.mysql(io::Error::other("connection refused"));

        assert!(chain::is_match(&err, catalog.get(Sentinel::MySql)));
        assert_eq!(err.message(), "connection refused");
        assert!(!chain::is_biz_fault(&err));

        assert_eq!(catalog.rpc_failed(io::Error::other("x")).code(), 14001);
        assert_eq!(catalog.object_storage(io::Error::other("x")).code(), 16001);
        assert_eq!(catalog.mongodb(io::Error::other("x")).code(), 12001);
        assert_eq!(catalog.invalid_param(io::Error::other("x")).code(), 10001);
        assert_eq!(catalog.unknown(io::Error::other("x")).code(), 10000);
    }

    #[test]
    fn translator_uses_unknown_sentinel() {
        let catalog = Catalog::standard();
        let translator = catalog.translator();
        assert_eq!(translator.unknown(), catalog.get(Sentinel::Unknown));

        let exploded = translator.explode_external(Some(&io::Error::other("boom")));
        assert_eq!(exploded.code, -10000);
        assert_eq!(exploded.detail, "boom");
    }
}
