// src/core/html.rs
//
// Structural matching over a parsed DOM.
//
// A site is described by a target tag (usually `a`) plus a list of
// `AncestorPath` constraints: "walk up td → tr → table from the candidate and
// check the table's attributes". Every constraint must hold for a candidate to
// be yielded. No per-site parser code is needed for the lookup itself.
//
// Tag and attribute names are compared as html5ever reports them (lowercase).

use scraper::{ElementRef, Html};

use crate::core::sanitize::normalize_ws;

/// Attributes whose value is a whitespace-separated token set.
/// Compared order-insensitively.
const MULTI_VALUED: &[&str] = &[
    "class", "rel", "rev", "accept-charset", "headers", "accesskey", "dropzone",
];

/// html5ever inserts `<tbody>` under every `<table>`; listing markup rarely
/// has one. Paths step over it unless they name it.
const IMPLIED: &str = "tbody";

fn canonical(name: &str, value: &str) -> String {
    if MULTI_VALUED.contains(&name) {
        let mut tokens: Vec<&str> = value.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    } else {
        value.to_string()
    }
}

fn attr_value(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value().attr(name).map(|v| canonical(name, v))
}

/* ---------------- attribute rules ---------------- */

/// What an element must not carry.
///
/// Two flavours exist in the wild and mean different things, so a rule
/// declares which one it wants:
/// - `Names`: reject if the attribute is present at all.
/// - `Values`: reject only if the attribute is present with exactly that value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Forbidden {
    Names(Vec<String>),
    Values(Vec<(String, String)>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeRule {
    tag: String,
    required: Vec<(String, String)>,
    forbidden: Option<Forbidden>,
}

impl AttributeRule {
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_ascii_lowercase(), required: Vec::new(), forbidden: None }
    }

    pub fn require(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        let value = canonical(&name, value);
        self.required.push((name, value));
        self
    }

    pub fn forbid_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names.into_iter().map(|n| n.as_ref().to_ascii_lowercase()).collect();
        self.forbidden = Some(Forbidden::Names(names));
        self
    }

    pub fn forbid_values<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| {
                let k = k.as_ref().to_ascii_lowercase();
                let v = canonical(&k, v.as_ref());
                (k, v)
            })
            .collect();
        self.forbidden = Some(Forbidden::Values(pairs));
        self
    }

    pub fn tag(&self) -> &str { &self.tag }

    /// Tag name matches and every required attribute is present with an equal value.
    pub fn has_required(&self, el: ElementRef<'_>) -> bool {
        if el.value().name() != self.tag {
            return false;
        }
        self.required
            .iter()
            .all(|(k, v)| attr_value(el, k).as_deref() == Some(v.as_str()))
    }

    /// Full check: required attributes, then whichever forbidden flavour the rule declares.
    pub fn verify(&self, el: ElementRef<'_>) -> bool {
        if !self.has_required(el) {
            return false;
        }
        match &self.forbidden {
            None => true,
            Some(Forbidden::Names(names)) => lacks_forbidden_names(el, names),
            Some(Forbidden::Values(pairs)) => lacks_forbidden_values(el, pairs),
        }
    }
}

/// None of `names` is present on the element, whatever the value.
pub fn lacks_forbidden_names<S: AsRef<str>>(el: ElementRef<'_>, names: &[S]) -> bool {
    names.iter().all(|n| el.value().attr(n.as_ref()).is_none())
}

/// None of `pairs` is present with exactly that value.
pub fn lacks_forbidden_values(el: ElementRef<'_>, pairs: &[(String, String)]) -> bool {
    pairs
        .iter()
        .all(|(k, v)| attr_value(el, k).as_deref() != Some(v.as_str()))
}

/* ---------------- ancestor paths ---------------- */

/// A rule checked against the element reached by walking `path` upwards.
///
/// `path` lists tag names from the candidate (exclusive) up to the checked
/// ancestor (inclusive). An empty path checks the candidate itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AncestorPath {
    path: Vec<String>,
    rule: AttributeRule,
}

impl AncestorPath {
    pub fn new<S: AsRef<str>>(path: &[S], rule: AttributeRule) -> Self {
        let path = path.iter().map(|p| p.as_ref().to_ascii_lowercase()).collect();
        Self { path, rule }
    }

    /// Empty path: the rule applies to the candidate element.
    pub fn itself(rule: AttributeRule) -> Self {
        Self { path: Vec::new(), rule }
    }

    pub fn path(&self) -> &[String] { &self.path }
    pub fn rule(&self) -> &AttributeRule { &self.rule }

    /// Walk `path.len()` steps up, checking each tag name on the way.
    /// `None` if a name differs or the chain runs out.
    pub fn reach<'a>(&self, el: ElementRef<'a>) -> Option<ElementRef<'a>> {
        let mut cur = el;
        for expected in &self.path {
            let mut parent = parent_element(cur)?;
            if parent.value().name() == IMPLIED && expected != IMPLIED {
                parent = parent_element(parent)?;
            }
            if parent.value().name() != expected {
                return None;
            }
            cur = parent;
        }
        Some(cur)
    }

    pub fn holds(&self, el: ElementRef<'_>) -> bool {
        self.reach(el).is_some_and(|target| self.rule.verify(target))
    }
}

/// Every `tag` element satisfying all `constraints`, in document order.
pub fn find<'a>(
    doc: &'a Html,
    tag: &'a str,
    constraints: &'a [AncestorPath],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
        .filter(move |el| constraints.iter().all(|c| c.holds(*el)))
}

/* ---------------- tree helpers ---------------- */

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// `n` plain parent steps (no tbody skipping): `ancestor(a, 2)` is `a.parent.parent`.
pub fn ancestor(el: ElementRef<'_>, n: usize) -> Option<ElementRef<'_>> {
    let mut cur = el;
    for _ in 0..n {
        cur = parent_element(cur)?;
    }
    Some(cur)
}

pub fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children().filter_map(ElementRef::wrap)
}

/* ---------------- text helpers ---------------- */

/// Follow single-child elements down to a lone text node and return it trimmed.
/// `None` as soon as a level has zero or several children.
///
/// `<a><font><b> 招标公告 </b></font></a>` → `Some("招标公告")`
pub fn collapse_single_child_text(el: ElementRef<'_>) -> Option<String> {
    let mut cur = el;
    loop {
        let mut children = cur.children();
        let only = children.next()?;
        if children.next().is_some() {
            return None;
        }
        match ElementRef::wrap(only) {
            Some(child) => cur = child,
            None => return only.value().as_text().map(|t| t.trim().to_string()),
        }
    }
}

/// All non-empty text pieces under `el`, depth first, joined with `-`.
pub fn collect_text(el: ElementRef<'_>) -> Option<String> {
    let mut parts = Vec::new();
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if let Some(t) = collect_text(child_el) {
                parts.push(t);
            }
        } else if let Some(text) = child.value().as_text() {
            let t = text.trim();
            if !t.is_empty() {
                parts.push(t.to_string());
            }
        }
    }
    (!parts.is_empty()).then(|| parts.join("-"))
}

/// Concatenated descendant text, whitespace collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// Text of the first child node, element or not.
pub fn first_child_text(el: ElementRef<'_>) -> Option<String> {
    let first = el.children().next()?;
    match ElementRef::wrap(first) {
        Some(child) => Some(element_text(child)),
        None => first.value().as_text().map(|t| normalize_ws(t)),
    }
}
