use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::sync::RwLock;

use crate::errors::{ProcessError, Result};

fn system_resolver(host: &str) -> Vec<IpAddr> {
	// port is irrelevant, ToSocketAddrs just wants one
	(host, 443).to_socket_addrs()
		.map(|it| it.map(|addr: SocketAddr| addr.ip()).collect())
		.unwrap_or_default()
}

fn forbidden_ip(addr: &IpAddr) -> bool {
	match addr {
		IpAddr::V4(v4) =>
			v4.is_private() || v4.is_loopback() || v4.is_link_local()
				|| v4.is_broadcast() || v4.is_unspecified(),
		IpAddr::V6(v6) => {
			let seg = v6.segments();
			v6.is_loopback() || v6.is_unspecified()
				|| (seg[0] & 0xfe00) == 0xfc00 // unique local fc00::/7
				|| (seg[0] & 0xffc0) == 0xfe80 // link local fe80::/10
		},
	}
}

/// refuses urls that could be used to probe the local network. hostnames get
/// resolved and every returned address must be public. verdicts are cached so
/// repeated fetches to the same host skip the dns round trip, but only
/// positive ones: a host that failed once may be a transient dns hiccup.
pub struct UrlGuard {
	debug: bool,
	cache: RwLock<HashMap<String, bool>>,
	resolver: fn(&str) -> Vec<IpAddr>,
}

impl Default for UrlGuard {
	fn default() -> Self {
		Self::new(false)
	}
}

impl UrlGuard {
	pub fn new(debug: bool) -> Self {
		UrlGuard { debug, cache: RwLock::new(HashMap::new()), resolver: system_resolver }
	}

	/// swap out the dns step, mostly for embedders with their own resolver
	pub fn with_resolver(resolver: fn(&str) -> Vec<IpAddr>) -> Self {
		UrlGuard { debug: false, cache: RwLock::new(HashMap::new()), resolver }
	}

	pub fn is_url_valid(&self, url: &str) -> bool {
		let parsed = match url::Url::parse(url) {
			Ok(x) => x,
			Err(e) => {
				tracing::debug!("rejecting unparseable url '{url}': {e}");
				return false;
			},
		};

		if !matches!(parsed.scheme(), "http" | "https") {
			return false;
		}

		// host_str() keeps the brackets around ipv6 literals, go through the
		// parsed host so literals never reach the resolver path
		let host = match parsed.host() {
			Some(url::Host::Ipv4(ip)) => return !forbidden_ip(&IpAddr::V4(ip)),
			Some(url::Host::Ipv6(ip)) => return !forbidden_ip(&IpAddr::V6(ip)),
			Some(url::Host::Domain(name)) => name.to_string(),
			None => return false,
		};

		if host == "localhost" {
			return self.debug;
		}

		if let Ok(cache) = self.cache.read() {
			if cache.get(&host).copied().unwrap_or(false) {
				return true;
			}
		}

		let addrs = (self.resolver)(&host);
		let verdict = !addrs.is_empty() && !addrs.iter().any(forbidden_ip);
		if verdict {
			// negative verdicts are not cached, dns hiccups should get retried
			if let Ok(mut cache) = self.cache.write() {
				cache.insert(host, true);
			}
		}
		verdict
	}

	pub fn check(&self, url: &str) -> Result<()> {
		if self.is_url_valid(url) {
			Ok(())
		} else {
			Err(ProcessError::InvalidUrl(url.to_string()))
		}
	}
}

#[cfg(test)]
mod test {
	use std::net::IpAddr;

	fn public_resolver(_host: &str) -> Vec<IpAddr> {
		vec!["93.184.216.34".parse().unwrap()]
	}

	fn private_resolver(_host: &str) -> Vec<IpAddr> {
		vec!["192.168.1.7".parse().unwrap()]
	}

	fn empty_resolver(_host: &str) -> Vec<IpAddr> {
		vec![]
	}

	#[test]
	fn rejects_non_http_schemes() {
		let guard = super::UrlGuard::with_resolver(public_resolver);
		assert!(!guard.is_url_valid("ftp://example.com/file"));
		assert!(!guard.is_url_valid("file:///etc/passwd"));
		assert!(guard.is_url_valid("https://example.com/actor"));
	}

	#[test]
	fn rejects_localhost_unless_debug() {
		let guard = super::UrlGuard::with_resolver(public_resolver);
		assert!(!guard.is_url_valid("http://localhost:8000/inbox"));
		let debug_guard = super::UrlGuard::new(true);
		assert!(debug_guard.is_url_valid("http://localhost:8000/inbox"));
	}

	#[test]
	fn rejects_private_address_literals() {
		let guard = super::UrlGuard::with_resolver(public_resolver);
		assert!(!guard.is_url_valid("http://10.0.0.1/x"));
		assert!(!guard.is_url_valid("http://192.168.0.10/x"));
		assert!(!guard.is_url_valid("http://127.0.0.1/x"));
		assert!(!guard.is_url_valid("http://[::1]/x"));
		assert!(!guard.is_url_valid("http://[fd12::1]/x"));
		assert!(!guard.is_url_valid("http://[fe80::1]/x"));
		assert!(guard.is_url_valid("http://93.184.216.34/x"));
		assert!(guard.is_url_valid("http://[2606:2800:220:1:248:1893:25c8:1946]/x"));
	}

	#[test]
	fn address_literals_never_consult_the_resolver() {
		// a resolver (or its cache) answering for a bracketed literal must not
		// override the literal's own verdict
		let guard = super::UrlGuard::with_resolver(public_resolver);
		assert!(guard.is_url_valid("https://good.example/a"));
		assert!(!guard.is_url_valid("http://[fd12::1]/x"));
		assert!(!guard.is_url_valid("http://10.0.0.1/x"));
	}

	#[test]
	fn rejects_hosts_resolving_to_private_space() {
		let guard = super::UrlGuard::with_resolver(private_resolver);
		assert!(!guard.is_url_valid("https://evil.example/actor"));
	}

	#[test]
	fn rejects_hosts_that_do_not_resolve() {
		let guard = super::UrlGuard::with_resolver(empty_resolver);
		assert!(!guard.is_url_valid("https://nope.invalid/actor"));
	}

	#[test]
	fn caches_positive_verdicts_only() {
		let guard = super::UrlGuard::with_resolver(public_resolver);
		assert!(guard.is_url_valid("https://good.example/a"));
		assert!(guard.cache.read().unwrap().get("good.example").copied().unwrap_or(false));

		let guard = super::UrlGuard::with_resolver(private_resolver);
		assert!(!guard.is_url_valid("https://bad.example/a"));
		assert!(guard.cache.read().unwrap().get("bad.example").is_none());
	}

	#[test]
	fn check_maps_to_invalid_url_error() {
		let guard = super::UrlGuard::with_resolver(public_resolver);
		assert!(matches!(
			guard.check("gopher://example.com"),
			Err(crate::ProcessError::InvalidUrl(_)),
		));
	}
}
