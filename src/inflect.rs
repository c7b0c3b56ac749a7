//! Inflection helpers for resource naming.
//!
//! Model names follow the `Namespace::TypeName` convention. These helpers turn
//! them into URL segments (`namespace/type_names`), response keys
//! (`type_name`, `namespace_type_name`) and human readable labels. The rules
//! cover regular English nouns plus a short list of irregular and uncountable
//! words; they are deterministic and round-trip for single and simple compound
//! words.

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "metadata",
];

/// `"Foo::BarBaz"` → `"foo/bar_baz"`.
pub fn underscore(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    let mut chars = name.replace("::", "/").chars().collect::<Vec<_>>().into_iter().peekable();

    while let Some(ch) = chars.next() {
        if ch == '-' {
            result.push('_');
        } else if ch.is_uppercase() {
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                // "HTTPServer" → "http_server": break before the last capital of a run
                Some(p) if p.is_uppercase() => chars.peek().is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
        prev = Some(ch);
    }

    result
}

/// `"Foo::Bar"` → `"Bar"`.
pub fn demodulize(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Pluralize the last `/`- or `_`-separated word of `word`.
pub fn pluralize(word: &str) -> String {
    inflect_last_word(word, pluralize_word)
}

/// Singularize the last `/`- or `_`-separated word of `word`.
pub fn singularize(word: &str) -> String {
    inflect_last_word(word, singularize_word)
}

/// `"cyanide_flask"` → `"Cyanide flask"`, `"author_id"` → `"Author"`.
pub fn humanize(attribute: &str) -> String {
    let trimmed = attribute.strip_suffix("_id").unwrap_or(attribute);
    let spaced = trimmed.replace('_', " ");
    let spaced = spaced.trim();

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn inflect_last_word(word: &str, inflect: fn(&str) -> String) -> String {
    match word.rfind(['/', '_']) {
        Some(idx) => format!("{}{}", &word[..=idx], inflect(&word[idx + 1..])),
        None => inflect(word),
    }
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if word.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return (*plural).to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == lower) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", stem);
        }
    }
    if word.ends_with(['s', 'x', 'z']) || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

fn singularize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if word.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == lower) {
        return (*singular).to_string();
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == lower) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

/// Names derived once from a model name such as `"Foo::Bar"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceName {
    model_name: String,
    key: String,
    collection: String,
    element: String,
    singular: String,
}

impl ResourceName {
    pub fn new(model_name: &str) -> Self {
        let key = underscore(model_name);
        Self {
            model_name: model_name.to_string(),
            collection: pluralize(&key),
            element: underscore(demodulize(model_name)),
            singular: key.replace('/', "_"),
            key,
        }
    }

    /// The name the model was declared with (`"Foo::Bar"`).
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Registry key (`"foo/bar"`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Collection path segment (`"foo/bars"`).
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Response-body keys to probe, demodulized first (`["bar", "foo_bar"]`).
    pub fn unpack_keys(&self) -> Vec<&str> {
        let mut keys = vec![self.element.as_str()];
        if self.singular != self.element {
            keys.push(self.singular.as_str());
        }
        keys
    }
}

/// Resource key a conventionally named repository type serves:
/// `"CategoryRepository"` → `"category"`, `"Shop::ItemRepository"` → `"shop/item"`.
pub fn repository_resource(type_name: &str) -> String {
    let stem = type_name.strip_suffix("Repository").unwrap_or(type_name);
    let stem = if stem.is_empty() || stem.ends_with("::") {
        type_name
    } else {
        stem
    };
    underscore(stem)
}
