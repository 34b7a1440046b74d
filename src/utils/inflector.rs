//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 词形变化工具
//!
//! 负责模型层命名（camelCase）与线上命名（snake_case）之间的转换，
//! 以及类型名的单复数变化。

use crate::config::InflectionConfig;
use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use std::collections::{BTreeMap, BTreeSet};

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("ox", "oxen"),
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
];

/// 词形变化器
///
/// 复数规则只作用于名称的最后一个单词，
/// 因此 `homePlanet` 与 `home_planet` 都能正确变为复数。
#[derive(Debug, Clone)]
pub struct Inflector {
    irregular: BTreeMap<String, String>,
    uncountable: BTreeSet<String>,
}

impl Default for Inflector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inflector {
    /// 创建带内置规则的词形变化器
    pub fn new() -> Self {
        Self {
            irregular: IRREGULAR
                .iter()
                .map(|(singular, plural)| (singular.to_string(), plural.to_string()))
                .collect(),
            uncountable: UNCOUNTABLE.iter().map(|word| word.to_string()).collect(),
        }
    }

    /// 在内置规则之上叠加配置中的规则
    pub fn from_config(config: &InflectionConfig) -> Self {
        let mut inflector = Self::new();
        for (singular, plural) in &config.irregular {
            inflector.irregular(singular, plural);
        }
        for word in &config.uncountable {
            inflector.uncountable.insert(word.to_lowercase());
        }
        inflector
    }

    pub fn irregular(&mut self, singular: &str, plural: &str) {
        self.irregular
            .insert(singular.to_lowercase(), plural.to_lowercase());
    }

    /// `home_planet` -> `homePlanet`
    pub fn camelize(&self, word: &str) -> String {
        word.to_lower_camel_case()
    }

    /// `homePlanet` -> `home_planet`
    pub fn underscore(&self, word: &str) -> String {
        word.to_snake_case()
    }

    /// `yellowMinion` -> `YellowMinion`
    pub fn classify(&self, word: &str) -> String {
        self.singularize(word).to_upper_camel_case()
    }

    pub fn pluralize(&self, word: &str) -> String {
        let (prefix, last) = split_last_word(word);
        let lower = last.to_lowercase();
        if lower.is_empty() || self.uncountable.contains(&lower) {
            return word.to_string();
        }
        if self.irregular.values().any(|plural| *plural == lower) {
            return word.to_string();
        }
        let inflected = match self.irregular.get(&lower) {
            Some(plural) => plural.clone(),
            None => pluralize_regular(&lower),
        };
        format!("{prefix}{}", match_case(last, &inflected))
    }

    pub fn singularize(&self, word: &str) -> String {
        let (prefix, last) = split_last_word(word);
        let lower = last.to_lowercase();
        if lower.is_empty() || self.uncountable.contains(&lower) {
            return word.to_string();
        }
        if self.irregular.contains_key(&lower) {
            return word.to_string();
        }
        let inflected = match self
            .irregular
            .iter()
            .find(|(_, plural)| **plural == lower)
        {
            Some((singular, _)) => singular.clone(),
            None => singularize_regular(&lower),
        };
        format!("{prefix}{}", match_case(last, &inflected))
    }
}

/// 拆分出最后一个单词：`home_planet` -> (`home_`, `planet`)，`homePlanet` -> (`home`, `Planet`)
fn split_last_word(word: &str) -> (&str, &str) {
    let boundary = word
        .char_indices()
        .rev()
        .find(|(index, ch)| *index > 0 && (ch.is_uppercase() || *ch == '_'))
        .map(|(index, ch)| if ch == '_' { index + 1 } else { index })
        .unwrap_or(0);
    word.split_at(boundary)
}

fn match_case(original: &str, inflected: &str) -> String {
    let mut chars = inflected.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(head)) if first.is_uppercase() => {
            head.to_uppercase().chain(chars).collect()
        }
        _ => inflected.to_string(),
    }
}

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn pluralize_regular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|ch| !is_vowel(ch)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

fn singularize_regular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
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
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}
