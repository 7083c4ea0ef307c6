//! Conversion of raw dependency-graph labels into canonical addresses.
//!
//! `terraform graph` labels nodes like `"[root] aws_instance.web (expand)"`
//! or `"[root] provider[\"registry.terraform.io/hashicorp/aws\"].west"`. The
//! rules below strip the decoration and fold module members and provider
//! registry paths so that the graph and the block index agree on names.

use log::trace;

use crate::address::{CanonicalAddress, Kind};

/// Normalize a raw graph label into a [`CanonicalAddress`].
///
/// Total and deterministic. Rules, applied in order:
///
/// 1. trim whitespace and one pair of surrounding quotes
/// 2. drop a leading scope marker such as `[root] `
/// 3. keep the first whitespace-delimited token, dropping annotations like
///    `(expand)` or `(close)`
/// 4. strip trailing quote artifacts
/// 5. collapse `module.<outer>.<anything>` to `module.<outer>`
/// 6. rewrite `provider["<registry>/<type>"]` to `provider.<type>`, with the
///    alias appended when one follows the closing bracket
/// 7. prefix a bare `<type>.<name>` managed resource with `resource.`
///
/// # Examples
///
/// ```
/// # use tfsplit_core::normalize;
/// assert_eq!(
///     normalize("\"[root] aws_instance.web (expand)\"").as_str(),
///     "resource.aws_instance.web"
/// );
/// assert_eq!(
///     normalize(r#"[root] provider["registry.terraform.io/hashicorp/aws"].west"#).as_str(),
///     "provider.awswest"
/// );
/// ```
pub fn normalize(raw: &str) -> CanonicalAddress {
    let label = strip_quotes(raw.trim());
    let label = strip_scope_marker(label);
    let label = label.split_whitespace().next().unwrap_or_default();
    let label = label.trim_end_matches('"');

    let canonical = if let Some(rest) = label.strip_prefix("module.") {
        let outer = rest.split(['.', '[']).next().unwrap_or(rest);
        format!("module.{outer}")
    } else if label.starts_with("provider[") {
        provider_address(label)
    } else if is_bare_resource(label) {
        format!("resource.{label}")
    } else {
        label.to_string()
    };

    trace!(raw, canonical = canonical.as_str(); "Normalized graph label");
    CanonicalAddress::new(canonical)
}

fn strip_quotes(label: &str) -> &str {
    label
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(label)
}

fn strip_scope_marker(label: &str) -> &str {
    match label.find("] ") {
        Some(end) if label.starts_with('[') => label[end + 2..].trim_start(),
        _ => label,
    }
}

fn provider_address(label: &str) -> String {
    let open = "provider[".len();
    let close = label.rfind(']').filter(|&i| i >= open).unwrap_or(label.len());

    let registry_path = label[open..close].trim_matches(|c| c == '"' || c == '\\');
    let provider_type = registry_path.rsplit('/').next().unwrap_or(registry_path);

    let alias = label
        .get(close + 1..)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or_default();

    format!("provider.{provider_type}{alias}")
}

fn is_bare_resource(label: &str) -> bool {
    let Some((head, name)) = label.split_once('.') else {
        return false;
    };
    !head.is_empty()
        && !name.is_empty()
        && Kind::from_prefix(head).is_none()
        && head
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> String {
        normalize(raw).as_str().to_string()
    }

    #[test]
    fn test_strips_root_marker_and_annotation() {
        assert_eq!(norm("[root] aws_instance.web (expand)"), "resource.aws_instance.web");
        assert_eq!(norm("\"[root] var.region\""), "var.region");
        assert_eq!(norm("[root] output.endpoint (expand)"), "output.endpoint");
        assert_eq!(norm("[root] local.tags (expand)"), "local.tags");
        assert_eq!(norm("[root] data.aws_ami.ubuntu (expand)"), "data.aws_ami.ubuntu");
    }

    #[test]
    fn test_collapses_module_members() {
        assert_eq!(norm("[root] module.network (expand)"), "module.network");
        assert_eq!(norm("[root] module.network.aws_vpc.this (expand)"), "module.network");
        assert_eq!(norm("[root] module.network.var.cidr (expand)"), "module.network");
        assert_eq!(norm("module.app[\"blue\"].aws_instance.web"), "module.app");
    }

    #[test]
    fn test_provider_with_escaped_quotes() {
        assert_eq!(
            norm(r#""[root] provider[\"registry.terraform.io/hashicorp/aws\"]""#),
            "provider.aws"
        );
    }

    #[test]
    fn test_provider_with_alias() {
        assert_eq!(
            norm(r#"[root] provider["registry.terraform.io/hashicorp/aws"].west"#),
            "provider.awswest"
        );
        assert_eq!(
            norm(r#"[root] provider[\"registry.terraform.io/hashicorp/google\"].eu (close)"#),
            "provider.googleeu"
        );
    }

    #[test]
    fn test_module_scoped_provider_collapses_to_module() {
        assert_eq!(
            norm(r#"[root] module.network.provider["registry.terraform.io/hashicorp/aws"]"#),
            "module.network"
        );
    }

    #[test]
    fn test_canonical_inputs_are_unchanged() {
        for canonical in [
            "resource.aws_instance.web",
            "data.aws_ami.ubuntu",
            "module.network",
            "var.region",
            "output.endpoint",
            "provider.aws",
            "local.tags",
            "terraform",
        ] {
            assert_eq!(norm(canonical), canonical);
        }
    }

    #[test]
    fn test_non_address_labels_pass_through() {
        assert_eq!(norm("[root] root"), "root");
        assert_eq!(norm("[root] meta.count-boundary (EachMode fixup)"), "meta.count-boundary");
        assert_eq!(norm(""), "");
    }

    #[test]
    fn test_unknown_block_kinds_read_as_resources() {
        assert_eq!(
            norm("[root] ephemeral.random_password.p (expand)"),
            "resource.ephemeral.random_password.p"
        );
        assert_eq!(norm("[root] check.health"), "resource.check.health");
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn segment_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,12}"
    }

    fn label_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (segment_strategy(), segment_strategy())
                .prop_map(|(t, n)| format!("\"[root] {t}.{n} (expand)\"")),
            (segment_strategy(), segment_strategy())
                .prop_map(|(m, rest)| format!("[root] module.{m}.{rest}")),
            (segment_strategy(), proptest::option::of(segment_strategy())).prop_map(
                |(t, alias)| {
                    let alias = alias.map(|a| format!(".{a}")).unwrap_or_default();
                    format!(r#"[root] provider[\"registry.terraform.io/acme/{t}\"]{alias}"#)
                }
            ),
            segment_strategy().prop_map(|v| format!("[root] var.{v}")),
        ]
    }

    fn check_normalize_is_idempotent(label: &str) -> Result<(), TestCaseError> {
        let once = normalize(label);
        let twice = normalize(once.as_str());
        prop_assert_eq!(once, twice);
        Ok(())
    }

    fn check_output_has_no_decoration(label: &str) -> Result<(), TestCaseError> {
        let canonical = normalize(label);
        let s = canonical.as_str();
        prop_assert!(!s.contains(' '));
        prop_assert!(!s.contains('"'));
        prop_assert!(!s.starts_with("[root]"));
        Ok(())
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(label in label_strategy()) {
            check_normalize_is_idempotent(&label)?;
        }

        #[test]
        fn normalized_labels_are_undecorated(label in label_strategy()) {
            check_output_has_no_decoration(&label)?;
        }
    }
}
