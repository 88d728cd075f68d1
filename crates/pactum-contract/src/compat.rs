//! Schema compatibility between a provider and a consumer.
//!
//! A provider schema `P` is compatible with a consumer schema `C` when every
//! value `P` admits is accepted by `C`, as far as keyword-level comparison
//! can tell. The comparison is conservative: anything it cannot prove is
//! reported as an [`Incompatibility`].

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};

const MAX_DEPTH: usize = 64;
/// Upper bound on schema pairs visited in one comparison.
const MAX_STEPS: usize = 50_000;

/// Keywords that never constrain data.
const ANNOTATIONS: [&str; 15] = [
    "title",
    "description",
    "$schema",
    "$id",
    "id",
    "$anchor",
    "$comment",
    "examples",
    "default",
    "readOnly",
    "writeOnly",
    "deprecated",
    "$defs",
    "definitions",
    "$vocabulary",
];

/// Keywords compared with a dedicated rule rather than by equality.
const STRUCTURAL: [&str; 10] = [
    "type",
    "enum",
    "const",
    "required",
    "properties",
    "additionalProperties",
    "items",
    "allOf",
    "anyOf",
    "oneOf",
];

const LOWER_BOUNDS: [&str; 5] = [
    "minimum",
    "exclusiveMinimum",
    "minLength",
    "minItems",
    "minProperties",
];

const UPPER_BOUNDS: [&str; 5] = [
    "maximum",
    "exclusiveMaximum",
    "maxLength",
    "maxItems",
    "maxProperties",
];

/// The rule an incompatibility violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// The provider may emit a type the consumer rejects.
    TypeMismatch,
    /// The consumer constrains a type the provider leaves open.
    TypeUnconstrained,
    /// The provider may emit a value outside the consumer's enumeration.
    EnumMismatch,
    /// The consumer enumerates values the provider leaves open.
    EnumUnconstrained,
    /// A consumer-required field is not offered by the provider.
    RequiredMissing,
    /// A consumer-required field is only optional in the provider.
    RequiredOptional,
    /// The consumer is closed to properties the provider may emit.
    ClosedProperties,
    /// The provider admits undeclared properties the consumer constrains.
    AdditionalProperties,
    /// The consumer constrains array items the provider leaves open.
    ItemsUnconstrained,
    /// The consumer's lower bound is above the provider's.
    LowerBound,
    /// The consumer's upper bound is below the provider's.
    UpperBound,
    /// A keyword the consumer sets differs in the provider.
    KeywordMismatch,
    /// No consumer alternative accepts the provider.
    NoMatchingBranch,
    /// The consumer rejects every value.
    Rejected,
    /// A `$ref` is not a local pointer that resolves.
    UnresolvedRef,
    /// Nesting or reference chains are too deep to compare.
    DepthExceeded,
}

impl Rule {
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::TypeMismatch => "type_mismatch",
            Rule::TypeUnconstrained => "type_unconstrained",
            Rule::EnumMismatch => "enum_mismatch",
            Rule::EnumUnconstrained => "enum_unconstrained",
            Rule::RequiredMissing => "required_missing",
            Rule::RequiredOptional => "required_optional",
            Rule::ClosedProperties => "closed_properties",
            Rule::AdditionalProperties => "additional_properties",
            Rule::ItemsUnconstrained => "items_unconstrained",
            Rule::LowerBound => "lower_bound",
            Rule::UpperBound => "upper_bound",
            Rule::KeywordMismatch => "keyword_mismatch",
            Rule::NoMatchingBranch => "no_matching_branch",
            Rule::Rejected => "rejected",
            Rule::UnresolvedRef => "unresolved_ref",
            Rule::DepthExceeded => "depth_exceeded",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason the provider does not satisfy the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incompatibility {
    /// JSON pointer into the consumer schema.
    pub path: String,
    pub rule: Rule,
    pub detail: String,
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "/"
        } else {
            self.path.as_str()
        };
        write!(f, "{path}: {} ({})", self.detail, self.rule)
    }
}

/// Compare two schemas. An empty result means compatible.
pub fn check_compatibility(provider: &Value, consumer: &Value) -> Vec<Incompatibility> {
    Checker {
        provider_root: provider,
        consumer_root: consumer,
        same_roots: provider == consumer,
        in_progress: RefCell::new(HashSet::new()),
        steps: Cell::new(0),
    }
    .check(provider, consumer, "", 0)
}

struct Checker<'a> {
    provider_root: &'a Value,
    consumer_root: &'a Value,
    same_roots: bool,
    /// Pairs whose keyword comparison is on the stack, as compact JSON.
    in_progress: RefCell<HashSet<(String, String)>>,
    steps: Cell<usize>,
}

type Reasons = Vec<Incompatibility>;

fn reason(path: &str, rule: Rule, detail: impl Into<String>) -> Reasons {
    vec![Incompatibility {
        path: path.to_string(),
        rule,
        detail: detail.into(),
    }]
}

impl Checker<'_> {
    fn check(&self, provider: &Value, consumer: &Value, path: &str, depth: usize) -> Reasons {
        if depth > MAX_DEPTH {
            return reason(path, Rule::DepthExceeded, "schemas nest too deeply to compare");
        }
        let steps = self.steps.get() + 1;
        self.steps.set(steps);
        if steps > MAX_STEPS {
            return reason(path, Rule::DepthExceeded, "schemas are too large to compare");
        }

        // Identical schemas accept identical values, provided their refs
        // point into identical documents.
        if provider == consumer && (self.same_roots || !mentions_ref(provider)) {
            return Vec::new();
        }

        if let Some(reference) = ref_of(consumer) {
            return match inline_ref(self.consumer_root, consumer, reference) {
                Some(resolved) => self.check(provider, &resolved, path, depth + 1),
                None => reason(
                    path,
                    Rule::UnresolvedRef,
                    format!("consumer reference '{reference}' does not resolve"),
                ),
            };
        }
        if let Some(reference) = ref_of(provider) {
            return match inline_ref(self.provider_root, provider, reference) {
                Some(resolved) => self.check(&resolved, consumer, path, depth + 1),
                None => reason(
                    path,
                    Rule::UnresolvedRef,
                    format!("provider reference '{reference}' does not resolve"),
                ),
            };
        }

        if !constrains(consumer) {
            return Vec::new();
        }
        if consumer == &Value::Bool(false) {
            return if provider == &Value::Bool(false) {
                Vec::new()
            } else {
                reason(path, Rule::Rejected, "consumer accepts no value")
            };
        }

        let empty = Map::new();
        let p = match provider {
            Value::Bool(false) => return Vec::new(),
            Value::Object(map) => map,
            _ => &empty,
        };
        let Some(c) = consumer.as_object() else {
            return reason(path, Rule::Rejected, "consumer schema is not a schema object");
        };

        // A recursive schema that returns to a pair already being compared
        // holds if everything else on the way holds.
        let key = (provider.to_string(), consumer.to_string());
        if !self.in_progress.borrow_mut().insert(key.clone()) {
            return Vec::new();
        }
        let reasons = self.compare(provider, consumer, p, c, path, depth);
        self.in_progress.borrow_mut().remove(&key);
        reasons
    }

    fn compare(
        &self,
        provider: &Value,
        consumer: &Value,
        p: &Map<String, Value>,
        c: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Reasons {
        if let Some(reasons) = self.split_provider(p, consumer, path, depth) {
            return reasons;
        }
        if let Some(reasons) = self.split_consumer(provider, c, path, depth) {
            return reasons;
        }

        let mut reasons = Vec::new();
        reasons.extend(check_type(p, c, path));
        reasons.extend(check_enum(p, c, path));
        reasons.extend(check_required(p, c, path));
        reasons.extend(self.check_properties(p, c, path, depth));
        reasons.extend(self.check_additional(p, c, path, depth));
        reasons.extend(self.check_items(p, c, path, depth));
        reasons.extend(check_bounds(p, c, path));
        reasons.extend(check_opaque(p, c, path));
        reasons
    }

    /// Provider alternatives: every `anyOf`/`oneOf` branch must satisfy the
    /// consumer. An `allOf` is folded into one schema when its conjuncts do
    /// not conflict, and otherwise satisfies the consumer when any conjunct
    /// does.
    fn split_provider(
        &self,
        p: &Map<String, Value>,
        consumer: &Value,
        path: &str,
        depth: usize,
    ) -> Option<Reasons> {
        for keyword in ["anyOf", "oneOf"] {
            if let Some(Value::Array(branches)) = p.get(keyword) {
                let base = without(p, keyword);
                let mut reasons = Vec::new();
                for branch in branches {
                    let merged = merge(&base, branch);
                    reasons.extend(self.check(&merged, consumer, path, depth + 1));
                }
                return Some(reasons);
            }
        }

        if let Some(Value::Array(conjuncts)) = p.get("allOf") {
            let base = without(p, "allOf");
            if let Some(folded) = fold_conjuncts(&base, conjuncts) {
                return Some(self.check(&folded, consumer, path, depth + 1));
            }
            let base_value = Value::Object(base.clone());
            let fallback = self.check(&base_value, consumer, path, depth + 1);
            if fallback.is_empty() {
                return Some(fallback);
            }
            for conjunct in conjuncts {
                let merged = merge(&base, conjunct);
                if self.check(&merged, consumer, path, depth + 1).is_empty() {
                    return Some(Vec::new());
                }
            }
            return Some(fallback);
        }
        None
    }

    /// Consumer combinators: `allOf` needs every conjunct, `anyOf`/`oneOf`
    /// need at least one branch.
    fn split_consumer(
        &self,
        provider: &Value,
        c: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Option<Reasons> {
        if let Some(Value::Array(conjuncts)) = c.get("allOf") {
            let base = Value::Object(without(c, "allOf"));
            let mut reasons = self.check(provider, &base, path, depth + 1);
            for (i, conjunct) in conjuncts.iter().enumerate() {
                let branch_path = format!("{path}/allOf/{i}");
                reasons.extend(self.check(provider, conjunct, &branch_path, depth + 1));
            }
            return Some(reasons);
        }

        for keyword in ["anyOf", "oneOf"] {
            if let Some(Value::Array(branches)) = c.get(keyword) {
                let base = Value::Object(without(c, keyword));
                let mut reasons = self.check(provider, &base, path, depth + 1);
                let matched = branches.iter().enumerate().any(|(i, branch)| {
                    let branch_path = format!("{path}/{keyword}/{i}");
                    self.check(provider, branch, &branch_path, depth + 1).is_empty()
                });
                if !matched {
                    reasons.extend(reason(
                        &format!("{path}/{keyword}"),
                        Rule::NoMatchingBranch,
                        format!("provider satisfies none of {} alternatives", branches.len()),
                    ));
                }
                return Some(reasons);
            }
        }
        None
    }

    fn check_properties(
        &self,
        p: &Map<String, Value>,
        c: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Reasons {
        let Some(Value::Object(consumer_props)) = c.get("properties") else {
            return Vec::new();
        };
        if !may_be_object(p) {
            return Vec::new();
        }
        let provider_props = properties_of(p);

        let mut reasons = Vec::new();
        for (name, consumer_schema) in consumer_props {
            let prop_path = format!("{path}/properties/{}", escape_pointer(name));
            if let Some(provider_schema) = provider_props.and_then(|props| props.get(name)) {
                reasons.extend(self.check(provider_schema, consumer_schema, &prop_path, depth + 1));
                continue;
            }
            reasons.extend(self.check_undeclared(p, name, consumer_schema, &prop_path, depth));
        }
        reasons
    }

    /// Compare what the provider admits for a property it does not declare
    /// by name: its matching `patternProperties`, else `additionalProperties`.
    fn check_undeclared(
        &self,
        p: &Map<String, Value>,
        name: &str,
        consumer_schema: &Value,
        path: &str,
        depth: usize,
    ) -> Reasons {
        let patterns = match pattern_schemas(p, name) {
            Ok(patterns) => patterns,
            Err(pattern) => {
                return reason(
                    path,
                    Rule::KeywordMismatch,
                    format!("provider pattern '{pattern}' cannot be evaluated"),
                )
            }
        };
        if !patterns.is_empty() {
            // The value meets every matching schema, so one that fits is enough.
            let mut first = None;
            for schema in patterns {
                let attempt = self.check(schema, consumer_schema, path, depth + 1);
                if attempt.is_empty() {
                    return attempt;
                }
                first.get_or_insert(attempt);
            }
            return first.unwrap_or_default();
        }

        match p.get("additionalProperties") {
            Some(Value::Bool(false)) => Vec::new(),
            Some(open @ Value::Object(_)) => self.check(open, consumer_schema, path, depth + 1),
            _ if constrains(consumer_schema) => reason(
                path,
                Rule::AdditionalProperties,
                format!("provider admits any value for undeclared property '{name}'"),
            ),
            _ => Vec::new(),
        }
    }

    fn check_additional(
        &self,
        p: &Map<String, Value>,
        c: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Reasons {
        let Some(consumer_extra) = c.get("additionalProperties") else {
            return Vec::new();
        };
        if !may_be_object(p) {
            return Vec::new();
        }
        let provider_extra = p.get("additionalProperties");
        let provider_patterns = p
            .get("patternProperties")
            .and_then(Value::as_object)
            .filter(|patterns| !patterns.is_empty());
        let extra_path = format!("{path}/additionalProperties");
        let consumer_props = properties_of(c);
        let undeclared: Vec<(&String, &Value)> = properties_of(p)
            .into_iter()
            .flatten()
            .filter(|(name, _)| !consumer_props.is_some_and(|props| props.contains_key(*name)))
            .collect();

        let mut reasons = Vec::new();
        match consumer_extra {
            Value::Bool(false) => {
                for (name, _) in undeclared {
                    reasons.extend(reason(
                        &extra_path,
                        Rule::ClosedProperties,
                        format!("provider offers '{name}', which the consumer does not declare"),
                    ));
                }
                if provider_extra != Some(&Value::Bool(false)) {
                    reasons.extend(reason(
                        &extra_path,
                        Rule::ClosedProperties,
                        "provider admits undeclared properties",
                    ));
                }
                if provider_patterns.is_some()
                    && c.get("patternProperties") != p.get("patternProperties")
                {
                    reasons.extend(reason(
                        &extra_path,
                        Rule::ClosedProperties,
                        "provider admits pattern properties the consumer does not declare",
                    ));
                }
            }
            Value::Object(_) => {
                for (_, provider_schema) in undeclared {
                    reasons.extend(self.check(provider_schema, consumer_extra, &extra_path, depth + 1));
                }
                for provider_schema in provider_patterns.into_iter().flat_map(Map::values) {
                    reasons.extend(self.check(provider_schema, consumer_extra, &extra_path, depth + 1));
                }
                match provider_extra {
                    Some(Value::Bool(false)) => {}
                    Some(open @ Value::Object(_)) => {
                        reasons.extend(self.check(open, consumer_extra, &extra_path, depth + 1));
                    }
                    _ if constrains(consumer_extra) => {
                        reasons.extend(reason(
                            &extra_path,
                            Rule::AdditionalProperties,
                            "provider admits undeclared properties of any shape",
                        ));
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        reasons
    }

    fn check_items(
        &self,
        p: &Map<String, Value>,
        c: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Reasons {
        let Some(consumer_items) = c.get("items") else {
            return Vec::new();
        };
        let items_path = format!("{path}/items");

        match (p.get("items"), consumer_items) {
            // Tuple-form items are compared like any other opaque keyword.
            (_, Value::Array(_)) | (Some(Value::Array(_)), _) => {
                if p.get("items") == Some(consumer_items) {
                    Vec::new()
                } else {
                    reason(&items_path, Rule::KeywordMismatch, "tuple items differ")
                }
            }
            (Some(provider_items), _) => {
                self.check(provider_items, consumer_items, &items_path, depth + 1)
            }
            (None, _) if constrains(consumer_items) => reason(
                &items_path,
                Rule::ItemsUnconstrained,
                "provider does not constrain array items",
            ),
            (None, _) => Vec::new(),
        }
    }
}

fn check_type(p: &Map<String, Value>, c: &Map<String, Value>, path: &str) -> Reasons {
    let Some(accepted) = types_of(c) else {
        return Vec::new();
    };
    let type_path = format!("{path}/type");

    let offered = match types_of(p) {
        Some(offered) => offered,
        None => match enum_values(p) {
            Some(values) => values.iter().map(json_type).collect(),
            None => {
                return reason(
                    &type_path,
                    Rule::TypeUnconstrained,
                    format!("consumer expects {}, provider declares no type", accepted.join("|")),
                )
            }
        },
    };

    offered
        .iter()
        .filter(|t| !type_accepted(t, &accepted))
        .flat_map(|t| {
            reason(
                &type_path,
                Rule::TypeMismatch,
                format!("provider may emit {t}, consumer accepts {}", accepted.join("|")),
            )
        })
        .collect()
}

fn check_enum(p: &Map<String, Value>, c: &Map<String, Value>, path: &str) -> Reasons {
    let Some(accepted) = enum_values(c) else {
        return Vec::new();
    };
    let keyword = if c.contains_key("const") { "const" } else { "enum" };
    let enum_path = format!("{path}/{keyword}");

    match enum_values(p) {
        None => reason(
            &enum_path,
            Rule::EnumUnconstrained,
            "consumer enumerates values, provider does not",
        ),
        Some(offered) => offered
            .iter()
            .filter(|v| !accepted.contains(v))
            .flat_map(|v| {
                reason(
                    &enum_path,
                    Rule::EnumMismatch,
                    format!("provider may emit {v}, which the consumer does not accept"),
                )
            })
            .collect(),
    }
}

fn check_required(p: &Map<String, Value>, c: &Map<String, Value>, path: &str) -> Reasons {
    let guaranteed: HashSet<&str> = string_list(p.get("required")).collect();
    let declared = properties_of(p);
    let required_path = format!("{path}/required");

    string_list(c.get("required"))
        .filter(|name| !guaranteed.contains(name))
        .flat_map(|name| {
            if declared.is_some_and(|props| props.contains_key(name)) {
                reason(
                    &required_path,
                    Rule::RequiredOptional,
                    format!("consumer requires '{name}', provider marks it optional"),
                )
            } else {
                reason(
                    &required_path,
                    Rule::RequiredMissing,
                    format!("consumer requires '{name}', provider does not offer it"),
                )
            }
        })
        .collect()
}

fn check_bounds(p: &Map<String, Value>, c: &Map<String, Value>, path: &str) -> Reasons {
    let mut reasons = Vec::new();
    for (keywords, lower) in [(LOWER_BOUNDS, true), (UPPER_BOUNDS, false)] {
        for keyword in keywords {
            let Some(consumer_bound) = c.get(keyword) else {
                continue;
            };
            let bound_path = format!("{path}/{keyword}");
            // Draft 4 boolean exclusive flags are compared for equality.
            let Some(limit) = consumer_bound.as_f64() else {
                if p.get(keyword) != Some(consumer_bound) {
                    reasons.extend(reason(
                        &bound_path,
                        Rule::KeywordMismatch,
                        format!("provider's '{keyword}' differs"),
                    ));
                }
                continue;
            };
            let rule = if lower { Rule::LowerBound } else { Rule::UpperBound };
            match p.get(keyword).and_then(Value::as_f64) {
                None => reasons.extend(reason(
                    &bound_path,
                    rule,
                    format!("consumer sets {keyword} {limit}, provider is unbounded"),
                )),
                Some(offered) if (lower && offered < limit) || (!lower && offered > limit) => {
                    reasons.extend(reason(
                        &bound_path,
                        rule,
                        format!("consumer sets {keyword} {limit}, provider allows {offered}"),
                    ))
                }
                Some(_) => {}
            }
        }
    }
    reasons
}

fn check_opaque(p: &Map<String, Value>, c: &Map<String, Value>, path: &str) -> Reasons {
    c.iter()
        .filter(|(keyword, _)| {
            let keyword = keyword.as_str();
            !ANNOTATIONS.contains(&keyword)
                && !STRUCTURAL.contains(&keyword)
                && !LOWER_BOUNDS.contains(&keyword)
                && !UPPER_BOUNDS.contains(&keyword)
                && keyword != "$ref"
        })
        .filter(|(keyword, value)| p.get(keyword.as_str()) != Some(*value))
        .flat_map(|(keyword, _)| {
            reason(
                &format!("{path}/{}", escape_pointer(keyword)),
                Rule::KeywordMismatch,
                format!("consumer sets '{keyword}', provider does not match it"),
            )
        })
        .collect()
}

/// False for schemas that accept every value.
fn constrains(schema: &Value) -> bool {
    match schema {
        Value::Bool(accepts_all) => !accepts_all,
        Value::Object(map) => map.keys().any(|k| !ANNOTATIONS.contains(&k.as_str())),
        _ => true,
    }
}

fn mentions_ref(schema: &Value) -> bool {
    match schema {
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key == "$ref" || mentions_ref(value)),
        Value::Array(items) => items.iter().any(mentions_ref),
        _ => false,
    }
}

fn ref_of(schema: &Value) -> Option<&str> {
    schema.get("$ref").and_then(Value::as_str)
}

/// Resolve a local `$ref`. Constraining sibling keywords still apply, so
/// they and the target become an `allOf`.
fn inline_ref(root: &Value, schema: &Value, reference: &str) -> Option<Value> {
    let target = match reference {
        "#" => root,
        local => root.pointer(local.strip_prefix('#')?)?,
    };
    let siblings = Value::Object(without(schema.as_object()?, "$ref"));
    if !constrains(&siblings) {
        return Some(target.clone());
    }
    Some(json!({ "allOf": [siblings, target] }))
}

/// Fold `allOf` conjuncts into `base` when no constraining keyword is set
/// twice to different values. The result admits exactly what the `allOf`
/// admits.
fn fold_conjuncts(base: &Map<String, Value>, conjuncts: &[Value]) -> Option<Value> {
    let mut folded = base.clone();
    for conjunct in conjuncts {
        match conjunct {
            Value::Bool(true) => {}
            Value::Object(map) => {
                for (key, value) in map {
                    match folded.get(key) {
                        Some(existing) if existing == value => {}
                        Some(_) if ANNOTATIONS.contains(&key.as_str()) => {}
                        Some(_) => return None,
                        None => {
                            folded.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            _ => return None,
        }
    }
    Some(Value::Object(folded))
}

/// Schemas of the provider's `patternProperties` whose pattern matches
/// `name`. Fails with the first pattern that does not compile.
fn pattern_schemas<'a>(p: &'a Map<String, Value>, name: &str) -> Result<Vec<&'a Value>, &'a str> {
    let Some(Value::Object(patterns)) = p.get("patternProperties") else {
        return Ok(Vec::new());
    };
    let mut matched = Vec::new();
    for (pattern, schema) in patterns {
        let regex = Regex::new(pattern).map_err(|_| pattern.as_str())?;
        if regex.is_match(name) {
            matched.push(schema);
        }
    }
    Ok(matched)
}

/// False when the provider's `type` or enumeration rules out objects.
fn may_be_object(p: &Map<String, Value>) -> bool {
    if let Some(types) = types_of(p) {
        return types.iter().any(|t| t == "object");
    }
    enum_values(p).map_or(true, |values| values.iter().any(Value::is_object))
}

fn without(map: &Map<String, Value>, keyword: &str) -> Map<String, Value> {
    let mut copy = map.clone();
    copy.remove(keyword);
    copy
}

/// Overlay `branch` onto `base`. A `true` branch adds nothing.
fn merge(base: &Map<String, Value>, branch: &Value) -> Value {
    match branch {
        Value::Object(extra) => {
            let mut merged = base.clone();
            for (key, value) in extra {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        Value::Bool(true) => Value::Object(base.clone()),
        other => other.clone(),
    }
}

fn properties_of(map: &Map<String, Value>) -> Option<&Map<String, Value>> {
    map.get("properties").and_then(Value::as_object)
}

fn types_of(map: &Map<String, Value>) -> Option<Vec<String>> {
    match map.get("type")? {
        Value::String(kind) => Some(vec![kind.clone()]),
        Value::Array(kinds) => Some(
            kinds
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn type_accepted(offered: &str, accepted: &[String]) -> bool {
    accepted
        .iter()
        .any(|t| t == offered || (offered == "integer" && t == "number"))
}

fn enum_values(map: &Map<String, Value>) -> Option<Vec<Value>> {
    if let Some(value) = map.get("const") {
        return Some(vec![value.clone()]);
    }
    map.get("enum").and_then(Value::as_array).cloned()
}

fn json_type(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

fn string_list(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rules(provider: Value, consumer: Value) -> Vec<Rule> {
        check_compatibility(&provider, &consumer)
            .into_iter()
            .map(|i| i.rule)
            .collect()
    }

    #[test]
    fn required_subset_with_compatible_type() {
        let provider = json!({
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "string" } }
        });
        assert!(rules(provider, json!({"type": "object", "required": ["id"]})).is_empty());
    }

    #[test]
    fn consumer_requires_field_provider_lacks() {
        let provider = json!({
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "string" } }
        });
        let consumer = json!({"type": "object", "required": ["id", "email"]});
        let reasons = check_compatibility(&provider, &consumer);
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].rule, Rule::RequiredMissing);
        assert_eq!(reasons[0].path, "/required");
        assert!(reasons[0].detail.contains("email"));
    }

    #[test]
    fn optional_provider_field_does_not_meet_requirement() {
        let provider = json!({
            "type": "object",
            "properties": { "email": { "type": "string" } }
        });
        let consumer = json!({"type": "object", "required": ["email"]});
        assert_eq!(rules(provider, consumer), vec![Rule::RequiredOptional]);
    }

    #[test]
    fn integer_satisfies_number_but_not_reverse() {
        assert!(rules(json!({"type": "integer"}), json!({"type": "number"})).is_empty());
        assert_eq!(
            rules(json!({"type": "number"}), json!({"type": "integer"})),
            vec![Rule::TypeMismatch]
        );
    }

    #[test]
    fn nullable_provider_needs_nullable_consumer() {
        assert_eq!(
            rules(json!({"type": ["string", "null"]}), json!({"type": "string"})),
            vec![Rule::TypeMismatch]
        );
        assert!(rules(
            json!({"type": ["string", "null"]}),
            json!({"type": ["null", "string"]})
        )
        .is_empty());
    }

    #[test]
    fn untyped_provider_fails_typed_consumer() {
        assert_eq!(
            rules(json!({}), json!({"type": "object"})),
            vec![Rule::TypeUnconstrained]
        );
        assert!(rules(json!({"enum": ["a", "b"]}), json!({"type": "string"})).is_empty());
    }

    #[test]
    fn nested_objects_are_compared_recursively() {
        let provider = json!({
            "type": "object",
            "required": ["customer"],
            "properties": {
                "customer": {
                    "type": "object",
                    "required": ["id"],
                    "properties": { "id": { "type": "integer" } }
                }
            }
        });
        let ok = json!({
            "type": "object",
            "properties": {
                "customer": { "type": "object", "required": ["id"], "properties": { "id": { "type": "number" } } }
            }
        });
        assert!(check_compatibility(&provider, &ok).is_empty());

        let stricter = json!({
            "type": "object",
            "properties": {
                "customer": { "type": "object", "required": ["id", "tier"] }
            }
        });
        let reasons = check_compatibility(&provider, &stricter);
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].path, "/properties/customer/required");
        assert_eq!(reasons[0].rule, Rule::RequiredMissing);
    }

    #[test]
    fn arrays_compare_items_and_bounds() {
        let provider = json!({"type": "array", "items": {"type": "string"}, "minItems": 1});
        assert!(rules(
            provider.clone(),
            json!({"type": "array", "items": {"type": "string"}, "minItems": 1})
        )
        .is_empty());
        assert_eq!(
            rules(provider.clone(), json!({"type": "array", "items": {"type": "integer"}})),
            vec![Rule::TypeMismatch]
        );
        assert_eq!(
            rules(provider.clone(), json!({"type": "array", "maxItems": 10})),
            vec![Rule::UpperBound]
        );
        assert_eq!(
            rules(provider, json!({"type": "array", "minItems": 2})),
            vec![Rule::LowerBound]
        );
        assert_eq!(
            rules(json!({"type": "array"}), json!({"type": "array", "items": {"type": "string"}})),
            vec![Rule::ItemsUnconstrained]
        );
    }

    #[test]
    fn closed_consumer_rejects_extra_provider_fields() {
        let provider = json!({
            "type": "object",
            "properties": { "id": { "type": "string" }, "debug": { "type": "boolean" } },
            "additionalProperties": false
        });
        let consumer = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "additionalProperties": false
        });
        assert_eq!(rules(provider, consumer.clone()), vec![Rule::ClosedProperties]);

        let open_provider = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "additionalProperties": true
        });
        assert_eq!(rules(open_provider, consumer.clone()), vec![Rule::ClosedProperties]);

        // Without `additionalProperties` the provider is open as well.
        let implicit = json!({"type": "object", "properties": { "id": { "type": "string" } }});
        assert_eq!(rules(implicit, consumer.clone()), vec![Rule::ClosedProperties]);

        let closed = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "additionalProperties": false
        });
        assert!(rules(closed, consumer.clone()).is_empty());

        let patterned = json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "patternProperties": { "^x-": { "type": "string" } },
            "additionalProperties": false
        });
        assert_eq!(rules(patterned, consumer), vec![Rule::ClosedProperties]);
    }

    #[test]
    fn schema_valued_additional_properties_are_checked() {
        let provider = json!({
            "type": "object",
            "properties": { "count": { "type": "integer" } },
            "additionalProperties": { "type": "string" }
        });
        let consumer = json!({
            "type": "object",
            "properties": { "label": { "type": "string" } },
            "additionalProperties": { "type": "number" }
        });
        let reasons = check_compatibility(&provider, &consumer);
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].path, "/additionalProperties/type");
        assert_eq!(reasons[0].rule, Rule::TypeMismatch);
    }

    #[test]
    fn undeclared_provider_properties_admit_any_value() {
        let consumer = json!({"type": "object", "properties": {"note": {"type": "string"}}});
        let reasons = check_compatibility(&json!({"type": "object"}), &consumer);
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].rule, Rule::AdditionalProperties);
        assert_eq!(reasons[0].path, "/properties/note");

        let open = json!({"type": "object", "additionalProperties": true});
        assert_eq!(rules(open, consumer.clone()), vec![Rule::AdditionalProperties]);

        let closed = json!({"type": "object", "additionalProperties": false});
        assert!(rules(closed, consumer.clone()).is_empty());

        // A string never carries properties.
        assert!(rules(json!({"type": "string"}), json!({"properties": {"note": {"type": "string"}}}))
            .is_empty());
    }

    #[test]
    fn required_but_untyped_provider_field_is_not_trusted() {
        let provider = json!({"type": "object", "required": ["note"]});
        let consumer = json!({
            "type": "object",
            "required": ["note"],
            "properties": { "note": { "type": "string" } }
        });
        assert_eq!(rules(provider, consumer), vec![Rule::AdditionalProperties]);
    }

    #[test]
    fn pattern_properties_cover_undeclared_names() {
        let provider = json!({
            "type": "object",
            "patternProperties": { "^n": { "type": "string" } },
            "additionalProperties": false
        });
        let fits = json!({"type": "object", "properties": {"note": {"type": "string"}}});
        assert!(rules(provider.clone(), fits).is_empty());

        let narrower = json!({"type": "object", "properties": {"note": {"type": "integer"}}});
        assert_eq!(rules(provider.clone(), narrower), vec![Rule::TypeMismatch]);

        // Names no pattern matches fall through to the closed provider.
        let unmatched = json!({"type": "object", "properties": {"label": {"type": "integer"}}});
        assert!(rules(provider, unmatched).is_empty());

        let broken = json!({"type": "object", "patternProperties": { "(": {} }});
        let consumer = json!({"type": "object", "properties": {"note": {"type": "string"}}});
        assert_eq!(rules(broken, consumer), vec![Rule::KeywordMismatch]);
    }

    #[test]
    fn provider_patterns_meet_consumer_additional_schema() {
        let provider = json!({
            "type": "object",
            "patternProperties": { "^x-": { "type": "integer" } },
            "additionalProperties": false
        });
        let consumer = json!({"type": "object", "additionalProperties": {"type": "string"}});
        assert_eq!(rules(provider, consumer), vec![Rule::TypeMismatch]);
    }

    #[test]
    fn enums_must_be_subsets() {
        assert!(rules(json!({"enum": ["a"]}), json!({"enum": ["a", "b"]})).is_empty());
        assert_eq!(
            rules(json!({"enum": ["a", "c"]}), json!({"enum": ["a", "b"]})),
            vec![Rule::EnumMismatch]
        );
        assert_eq!(
            rules(json!({"type": "string"}), json!({"type": "string", "const": "x"})),
            vec![Rule::EnumUnconstrained]
        );
        assert!(rules(json!({"const": "x"}), json!({"enum": ["x"]})).is_empty());
    }

    #[test]
    fn opaque_keywords_need_equal_values() {
        assert!(rules(
            json!({"type": "string", "format": "email"}),
            json!({"type": "string", "format": "email"})
        )
        .is_empty());
        assert_eq!(
            rules(
                json!({"type": "string"}),
                json!({"type": "string", "pattern": "^[a-z]+$"})
            ),
            vec![Rule::KeywordMismatch]
        );
    }

    #[test]
    fn annotations_are_ignored() {
        assert!(rules(
            json!({"type": "string"}),
            json!({"type": "string", "title": "Name", "description": "who", "examples": ["x"]})
        )
        .is_empty());
    }

    #[test]
    fn boolean_schemas() {
        assert!(rules(json!({"type": "string"}), json!(true)).is_empty());
        assert!(rules(json!(false), json!({"type": "string"})).is_empty());
        assert_eq!(rules(json!({"type": "string"}), json!(false)), vec![Rule::Rejected]);
    }

    #[test]
    fn provider_alternatives_must_all_fit() {
        let provider = json!({"anyOf": [{"type": "string"}, {"type": "integer"}]});
        assert!(rules(provider.clone(), json!({"type": ["string", "number"]})).is_empty());
        assert_eq!(
            rules(provider, json!({"type": "string"})),
            vec![Rule::TypeMismatch]
        );
    }

    #[test]
    fn consumer_alternatives_need_one_match() {
        let consumer = json!({"oneOf": [{"type": "string"}, {"type": "boolean"}]});
        assert!(rules(json!({"type": "boolean"}), consumer.clone()).is_empty());
        assert_eq!(
            rules(json!({"type": "integer"}), consumer),
            vec![Rule::NoMatchingBranch]
        );
    }

    #[test]
    fn consumer_all_of_needs_every_conjunct() {
        let consumer = json!({"allOf": [{"type": "object"}, {"required": ["id"]}]});
        let provider = json!({"type": "object", "required": ["id"], "properties": {"id": {}}});
        assert!(rules(provider, consumer.clone()).is_empty());
        assert_eq!(
            rules(json!({"type": "object"}), consumer),
            vec![Rule::RequiredMissing]
        );
    }

    #[test]
    fn provider_all_of_fits_when_a_conjunct_does() {
        let provider = json!({"allOf": [{"type": "string"}, {"minLength": 3}]});
        assert!(rules(provider, json!({"type": "string"})).is_empty());

        // Conflicting conjuncts cannot be folded; one of them still fits.
        let conflicting = json!({"allOf": [{"type": "integer"}, {"type": ["integer", "string"]}]});
        assert!(rules(conflicting, json!({"type": "integer"})).is_empty());
    }

    #[test]
    fn provider_all_of_conjuncts_combine() {
        let provider = json!({"allOf": [{"type": "integer"}, {"minimum": 0}]});
        assert!(rules(provider, json!({"type": "integer", "minimum": 0})).is_empty());
    }

    #[test]
    fn ref_siblings_apply_alongside_target() {
        let consumer = json!({
            "$defs": { "x": { "type": ["string", "integer"] } },
            "$ref": "#/$defs/x",
            "type": "string"
        });
        assert_eq!(rules(json!({"type": "integer"}), consumer.clone()), vec![Rule::TypeMismatch]);
        assert!(rules(json!({"type": "string"}), consumer).is_empty());

        let provider = json!({
            "$defs": { "x": { "type": "integer" } },
            "$ref": "#/$defs/x",
            "minimum": 0
        });
        assert!(rules(provider, json!({"type": "integer", "minimum": 0})).is_empty());
    }

    #[test]
    fn local_refs_are_resolved() {
        let provider = json!({
            "type": "object",
            "required": ["item"],
            "properties": { "item": { "$ref": "#/$defs/item" } },
            "$defs": { "item": { "type": "object", "required": ["sku"], "properties": { "sku": { "type": "string" } } } }
        });
        let consumer = json!({
            "type": "object",
            "required": ["item"],
            "properties": { "item": { "$ref": "#/definitions/line" } },
            "definitions": { "line": { "type": "object", "required": ["sku"] } }
        });
        assert!(check_compatibility(&provider, &consumer).is_empty());

        let remote = json!({"$ref": "https://example.com/other.json"});
        assert_eq!(rules(json!({}), remote), vec![Rule::UnresolvedRef]);
    }

    #[test]
    fn recursive_refs_stop_at_depth_limit() {
        let looping = json!({"$ref": "#"});
        let reasons = check_compatibility(&looping, &json!({"type": "object"}));
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].rule, Rule::DepthExceeded);
    }

    #[test]
    fn recursive_trees_compare_without_blowup() {
        let tree = |value_type: &str| {
            json!({
                "$defs": {
                    "node": {
                        "type": "object",
                        "properties": {
                            "value": { "type": value_type },
                            "left": { "$ref": "#/$defs/node" },
                            "right": { "$ref": "#/$defs/node" }
                        },
                        "additionalProperties": false
                    }
                },
                "$ref": "#/$defs/node"
            })
        };

        let mut consumer = tree("integer");
        consumer["title"] = json!("tree");
        assert!(check_compatibility(&tree("integer"), &consumer).is_empty());

        let mut narrower = tree("string");
        narrower["title"] = json!("tree");
        assert_eq!(rules(tree("integer"), narrower), vec![Rule::TypeMismatch]);
    }

    #[test]
    fn identical_schemas_are_compatible() {
        let schemas = [
            json!({"allOf": [{"type": "string"}, {"minLength": 1}]}),
            json!({"oneOf": [{"type": "integer"}, {"type": "null"}]}),
            json!({"$defs": {"node": {"type": "object", "properties": {"next": {"$ref": "#/$defs/node"}}}}, "$ref": "#/$defs/node"}),
            json!({"type": "object", "properties": {"tags": {"type": "array", "items": {"enum": ["a", "b"]}}}}),
        ];
        for schema in schemas {
            assert!(check_compatibility(&schema, &schema).is_empty(), "{schema}");
        }
    }

    #[test]
    fn equal_fragments_with_refs_into_different_roots_are_compared() {
        let provider = json!({"$defs": {"id": {"type": "integer"}}, "properties": {"id": {"$ref": "#/$defs/id"}}});
        let consumer = json!({"$defs": {"id": {"type": "string"}}, "properties": {"id": {"$ref": "#/$defs/id"}}});
        assert_eq!(rules(provider, consumer), vec![Rule::TypeMismatch]);
    }

    #[test]
    fn property_names_are_pointer_escaped() {
        let provider = json!({"type": "object", "properties": {"a/b": {"type": "integer"}}});
        let consumer = json!({"type": "object", "properties": {"a/b": {"type": "string"}}});
        let reasons = check_compatibility(&provider, &consumer);
        assert_eq!(reasons[0].path, "/properties/a~1b/type");
    }
}
