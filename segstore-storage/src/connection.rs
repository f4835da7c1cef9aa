//! Connection descriptors and credentials.
//!
//! Two descriptor formats are understood:
//!
//! * S3-style URIs, as used by ECS and generic S3 endpoints:
//!   `https://[identity[:secret]@]host[:port][/path]?identity=..&secretKey=..&namespace=..`.
//!   Query parameters take precedence over user info; remaining query
//!   parameters are kept as client options.
//! * Azure connection strings: `DefaultEndpointsProtocol=https;AccountName=..;AccountKey=..`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::{Result, StorageError};

const IDENTITY_PARAM: &str = "identity";
const SECRET_PARAM: &str = "secretKey";

const AZURE_DEFAULT_PROTOCOL: &str = "https";
const AZURE_DEFAULT_SUFFIX: &str = "core.windows.net";

/// An identity and its secret.
///
/// The secret never appears in `Debug` or serialized output.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    identity: String,
    #[serde(skip)]
    secret: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("endpoint", &self.endpoint.as_str())
            .field("host_groups", &self.host_groups)
            .field("identity", &self.identity)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("options", &self.options)
            .finish()
    }
}

/// Hosts of one virtual data center, or of the whole cluster when `vdc` is unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostGroup {
    pub vdc: Option<String>,
    pub hosts: Vec<String>,
}

/// A parsed S3-style connection URI.
///
/// The host part may list several nodes (`http://node1,node2:9020`) or group
/// them by VDC (`http://vdc1(node1,node2),vdc2(node3):9020`). The port applies
/// to every host.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDescriptor {
    /// Endpoint of the first host, with user info and query stripped
    pub endpoint: Url,
    host_groups: Vec<HostGroup>,
    identity: Option<String>,
    #[serde(skip)]
    secret: Option<String>,
    /// Remaining query parameters (namespace, client tuning, ...)
    pub options: BTreeMap<String, String>,
}

impl ConnectionDescriptor {
    /// Parse the URI held by `property`.
    pub fn parse(property: &str, uri: &str) -> Result<Self> {
        let invalid = |reason: String| StorageError::InvalidConnectionUri {
            property: property.to_string(),
            reason,
        };

        let uri = uri.trim();
        if uri.is_empty() {
            return Err(invalid("empty".to_string()));
        }

        let (single_host_uri, host_groups) = match split_host_list(uri).map_err(&invalid)? {
            Some((rewritten, groups)) => (rewritten, Some(groups)),
            None => (uri.to_string(), None),
        };

        let mut url = Url::parse(&single_host_uri).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        let host_groups = match (host_groups, url.host_str()) {
            (Some(groups), _) => groups,
            (None, Some(host)) => vec![HostGroup {
                vdc: None,
                hosts: vec![host.to_string()],
            }],
            (None, None) => return Err(invalid("no host".to_string())),
        };

        let mut identity = non_empty(decode(url.username()));
        let mut secret = url.password().map(decode).and_then(non_empty);
        let mut options = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                IDENTITY_PARAM => identity = non_empty(value.into_owned()),
                SECRET_PARAM => secret = non_empty(value.into_owned()),
                _ => {
                    options.insert(key.into_owned(), value.into_owned());
                }
            }
        }

        url.set_username("")
            .and_then(|_| url.set_password(None))
            .map_err(|_| invalid("cannot strip user info".to_string()))?;
        url.set_query(None);

        Ok(Self {
            endpoint: url,
            host_groups,
            identity,
            secret,
            options,
        })
    }

    /// Every host, in declaration order.
    pub fn hosts(&self) -> Vec<&str> {
        self.host_groups
            .iter()
            .flat_map(|group| group.hosts.iter().map(String::as_str))
            .collect()
    }

    pub fn host_groups(&self) -> &[HostGroup] {
        &self.host_groups
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.options.get("namespace").map(String::as_str)
    }

    /// Credentials embedded in the URI; both halves are required.
    pub fn credentials(&self, property: &str) -> Result<Credentials> {
        let identity = self.identity.clone().ok_or(StorageError::MissingCredential {
            property: property.to_string(),
            field: IDENTITY_PARAM,
        })?;
        let secret = self.secret.clone().ok_or(StorageError::MissingCredential {
            property: property.to_string(),
            field: SECRET_PARAM,
        })?;
        Ok(Credentials::new(identity, secret))
    }
}

/// A parsed Azure storage connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AzureConnection {
    pub blob_endpoint: Url,
    pub credentials: Credentials,
}

impl AzureConnection {
    /// Parse the connection string held by `property`.
    ///
    /// `endpoint_override` replaces the blob endpoint from the string when set.
    pub fn parse(property: &str, connection_string: &str, endpoint_override: Option<&str>) -> Result<Self> {
        let invalid = |reason: String| StorageError::InvalidConnectionUri {
            property: property.to_string(),
            reason,
        };

        let mut fields = BTreeMap::new();
        for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected Key=Value, got '{}'", part)))?;
            fields.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
        if fields.is_empty() {
            return Err(invalid("empty".to_string()));
        }

        let account = fields
            .get("accountname")
            .filter(|v| !v.is_empty())
            .ok_or(StorageError::MissingCredential {
                property: property.to_string(),
                field: "AccountName",
            })?;
        let key = fields
            .get("accountkey")
            .filter(|v| !v.is_empty())
            .ok_or(StorageError::MissingCredential {
                property: property.to_string(),
                field: "AccountKey",
            })?;

        let endpoint = match endpoint_override.map(str::trim).filter(|e| !e.is_empty()) {
            Some(endpoint) => endpoint.to_string(),
            None => match fields.get("blobendpoint") {
                Some(endpoint) => endpoint.clone(),
                None => format!(
                    "{}://{}.blob.{}",
                    fields
                        .get("defaultendpointsprotocol")
                        .map(String::as_str)
                        .unwrap_or(AZURE_DEFAULT_PROTOCOL),
                    account,
                    fields
                        .get("endpointsuffix")
                        .map(String::as_str)
                        .unwrap_or(AZURE_DEFAULT_SUFFIX),
                ),
            },
        };
        let blob_endpoint = Url::parse(&endpoint).map_err(|e| invalid(format!("blob endpoint: {}", e)))?;

        Ok(Self {
            blob_endpoint,
            credentials: Credentials::new(account.clone(), key.clone()),
        })
    }
}

/// Split a multi-host authority off `uri`.
///
/// Returns `None` for a plain single-host URI. Otherwise returns the URI
/// rewritten to its first host, plus the parsed host groups.
fn split_host_list(uri: &str) -> std::result::Result<Option<(String, Vec<HostGroup>)>, String> {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return Ok(None);
    };
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let (userinfo, host_port) = match authority.rsplit_once('@') {
        Some((userinfo, host_port)) => (Some(userinfo), host_port),
        None => (None, authority),
    };
    if !host_port.contains([',', '(', ')']) {
        return Ok(None);
    }

    let (host_spec, port) = match host_port.rsplit_once(':') {
        Some((hosts, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (hosts, Some(port))
        }
        _ => (host_port, None),
    };
    let groups = parse_host_groups(host_spec)?;
    let first = groups
        .first()
        .and_then(|group| group.hosts.first())
        .ok_or_else(|| "no host".to_string())?;

    let mut rewritten = format!("{}://", scheme);
    if let Some(userinfo) = userinfo {
        rewritten.push_str(userinfo);
        rewritten.push('@');
    }
    rewritten.push_str(first);
    if let Some(port) = port {
        rewritten.push(':');
        rewritten.push_str(port);
    }
    rewritten.push_str(tail);
    Ok(Some((rewritten, groups)))
}

/// Parse `h1,h2` or `vdc1(h1,h2),vdc2(h3)`; the two forms cannot be mixed.
fn parse_host_groups(spec: &str) -> std::result::Result<Vec<HostGroup>, String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in spec.char_indices() {
        match c {
            '(' if depth > 0 => return Err("nested '(' in host list".to_string()),
            '(' => depth += 1,
            ')' if depth == 0 => return Err("unbalanced ')' in host list".to_string()),
            ')' => depth -= 1,
            ',' if depth == 0 => {
                items.push(&spec[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err("unclosed '(' in host list".to_string());
    }
    items.push(&spec[start..]);

    let mut plain = Vec::new();
    let mut groups = Vec::new();
    for item in items {
        match item.split_once('(') {
            Some((vdc, inner)) => {
                let inner = inner
                    .strip_suffix(')')
                    .ok_or_else(|| format!("unexpected text after VDC group '{}'", item))?;
                if vdc.is_empty()
                    || !vdc
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                {
                    return Err(format!("invalid VDC name '{}'", vdc));
                }
                let hosts = inner.split(',').map(parse_host).collect::<std::result::Result<_, _>>()?;
                groups.push(HostGroup {
                    vdc: Some(vdc.to_string()),
                    hosts,
                });
            }
            None => plain.push(parse_host(item)?),
        }
    }

    match (plain.is_empty(), groups.is_empty()) {
        (false, true) => Ok(vec![HostGroup {
            vdc: None,
            hosts: plain,
        }]),
        (true, false) => Ok(groups),
        _ => Err("cannot mix VDC groups and plain hosts".to_string()),
    }
}

fn parse_host(raw: &str) -> std::result::Result<String, String> {
    if raw.is_empty() {
        return Err("empty host in host list".to_string());
    }
    url::Host::parse(raw)
        .map(|host| host.to_string())
        .map_err(|e| format!("host '{}': {}", raw, e))
}

fn decode(raw: &str) -> String {
    let escaped = raw.replace('+', "%2B").replace('&', "%26");
    url::form_urlencoded::parse(format!("v={}", escaped).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
