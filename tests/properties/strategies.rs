//! Shared generators for deployment specs.

use proptest::prelude::*;

use cdnplan::domain::entities::{
    AclRuleSpec, CorsConfig, DeploymentSpec, FeatureFlags, SecondaryDnsConfig, TlsConfig,
};
use cdnplan::domain::value_objects::{
    Environment, RedirectRule, RedirectTable, SigningIdentityKind,
};

pub const CERTIFICATE: &str = "arn:aws:acm:us-east-1:123456789012:certificate/abc";

fn environment() -> impl Strategy<Value = Environment> {
    prop::sample::select(vec![
        Environment::Development,
        Environment::Staging,
        Environment::Testing,
        Environment::Qa,
        Environment::Production,
        Environment::Management,
    ])
}

fn signing_identity() -> impl Strategy<Value = SigningIdentityKind> {
    prop_oneof![
        Just(SigningIdentityKind::AccessControl),
        Just(SigningIdentityKind::LegacyIdentity),
    ]
}

fn features() -> impl Strategy<Value = FeatureFlags> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        signing_identity(),
    )
        .prop_map(
            |(restrict, versioning, encryption, headers, signing)| FeatureFlags {
                restrict_origin_access: restrict,
                versioning,
                encryption_at_rest: encryption,
                security_headers: headers,
                signing_identity: signing,
            },
        )
}

fn domains() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9]{0,8}", 1..=3).prop_map(|labels| {
        labels
            .into_iter()
            .map(|label| format!("{}.example.com", label))
            .collect()
    })
}

fn admin_principal() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z][a-z0-9-]{0,10}")
        .prop_map(|user| user.map(|user| format!("arn:aws:iam::123456789012:user/{}", user)))
}

fn dns() -> impl Strategy<Value = Option<SecondaryDnsConfig>> {
    prop::option::of((any::<bool>(), prop::option::of(1usize..=3))).prop_map(|dns| {
        dns.map(|(record, acl)| {
            let config = SecondaryDnsConfig::new("zone-123").with_record(record);
            match acl {
                Some(count) => config.with_acl(
                    (0..count)
                        .map(|i| AclRuleSpec::new(format!("rule-{}", i), format!("10.0.0.{}", i)))
                        .collect(),
                ),
                None => config,
            }
        })
    })
}

fn redirects() -> impl Strategy<Value = Option<RedirectTable>> {
    prop::option::of(prop::collection::vec(("/[a-z]{1,6}", "/[a-z]{1,6}"), 0..=3)).prop_map(
        |rules| {
            rules.map(|rules| {
                rules
                    .into_iter()
                    .map(|(src, dst)| RedirectRule::new(src, dst))
                    .collect()
            })
        },
    )
}

/// Any spec the builder accepts
pub fn spec() -> impl Strategy<Value = DeploymentSpec> {
    (
        "[a-z][a-z0-9-]{0,12}[a-z0-9]",
        environment(),
        domains(),
        any::<bool>(),
        dns(),
        any::<bool>(),
        redirects(),
        (features(), admin_principal()),
    )
        .prop_map(
            |(name, environment, domains, tls, dns, cors, redirects, (features, admin))| {
                let mut builder = DeploymentSpec::builder(name)
                    .environment(environment)
                    .domains(domains)
                    .features(features)
                    .tls(if tls {
                        TlsConfig::enabled(CERTIFICATE)
                    } else {
                        TlsConfig::disabled()
                    });
                if let Some(dns) = dns {
                    builder = builder.dns(dns);
                }
                if cors {
                    builder = builder.cors(CorsConfig::default());
                }
                if let Some(rules) = redirects {
                    builder = builder.redirects(rules);
                }
                if let Some(principal) = admin {
                    builder = builder.admin_principal(principal);
                }
                builder.build().expect("generated spec is valid")
            },
        )
}
