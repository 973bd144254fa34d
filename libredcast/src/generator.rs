//! Content generation
//!
//! Picks a weighted content type and one of its templates, builds a prompt,
//! asks the text model for a note and splits the reply into title and body.
//! The randomness lives in small pure functions taking an explicit RNG; the
//! generator owns a seedable [`StdRng`] so whole runs can be replayed.

use chrono::Local;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info};

use crate::config::{Config, HashtagConfig, ProductConfig};
use crate::error::{ConfigError, Result};
use crate::model::{AnthropicModel, TextModel};
use crate::storage::RecordStore;
use crate::templates::{TemplateStore, VariablePool};
use crate::types::{normalize_tag, ContentType, GeneratedContent, Template};

pub const DEFAULT_HASHTAG_COUNT: usize = 6;

/// Title length the model is asked for, in characters
pub const TITLE_MIN_CHARS: usize = 12;
pub const TITLE_MAX_CHARS: usize = 20;

/// Body length the model is asked for, in characters
pub const BODY_MIN_CHARS: usize = 200;
pub const BODY_MAX_CHARS: usize = 350;

const SECONDARY_TAGS: usize = 3;
const OPTIONAL_TAGS: usize = 2;

/// `{name}` placeholder in a title pattern
static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

/// Pick one item with probability proportional to its weight
///
/// # Errors
///
/// Returns `ConfigError` if `items` is empty, the lengths differ, or no
/// weight is positive.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    weights: &[f64],
    rng: &mut R,
) -> Result<&'a T> {
    if items.is_empty() {
        return Err(ConfigError::MissingField("content_strategy.content_types".to_string()).into());
    }
    if items.len() != weights.len() {
        return Err(ConfigError::InvalidValue {
            field: "content_strategy.content_types.weight".to_string(),
            reason: format!("{} items but {} weights", items.len(), weights.len()),
        }
        .into());
    }

    let dist = WeightedIndex::new(weights).map_err(|e| ConfigError::InvalidValue {
        field: "content_strategy.content_types.weight".to_string(),
        reason: e.to_string(),
    })?;
    Ok(&items[dist.sample(rng)])
}

/// Compose hashtags: one primary, up to three secondary, up to two optional
///
/// Duplicates across pools are dropped keeping the first occurrence, so the
/// result is reproducible under a fixed seed. Every tag carries exactly one
/// leading `#`.
pub fn pick_hashtags<R: Rng + ?Sized>(
    pools: &HashtagConfig,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut candidates: Vec<&String> = Vec::new();
    candidates.extend(pools.primary.choose(rng));
    candidates.extend(pools.secondary.choose_multiple(rng, SECONDARY_TAGS));
    candidates.extend(pools.optional.choose_multiple(rng, OPTIONAL_TAGS));

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|tag| normalize_tag(tag))
        .filter(|tag| tag.len() > 1 && seen.insert(tag.clone()))
        .take(count)
        .collect()
}

/// Replace every `{variable}` in a title pattern with a random pool value
///
/// Repeated occurrences of one variable get the same value.
///
/// # Errors
///
/// Returns `ConfigError::UnknownVariable` if a referenced pool is absent or
/// empty.
pub fn fill_title_pattern<R: Rng + ?Sized>(
    pattern: &str,
    variables: &VariablePool,
    rng: &mut R,
) -> Result<String> {
    let re = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{([^{}\s]+)\}").expect("Valid placeholder regex"));

    let mut result = pattern.to_string();
    let mut done = HashSet::new();
    for cap in re.captures_iter(pattern) {
        let name = &cap[1];
        if !done.insert(name.to_string()) {
            continue;
        }
        let value = variables
            .get(name)
            .and_then(|values| values.choose(rng))
            .ok_or_else(|| ConfigError::UnknownVariable(name.to_string()))?;
        result = result.replace(&cap[0], value);
    }
    Ok(result)
}

/// Split a model reply into `(title, body)`
///
/// The first line is the title and everything after it the body. A reply
/// with no line break at all falls back to blank-line paragraphs: the first
/// paragraph is the title and the rest (here always nothing) the body, so a
/// single-line reply yields an empty body.
pub fn parse_reply(reply: &str) -> (String, String) {
    let text = reply.trim();
    if let Some((title, body)) = text.split_once('\n') {
        return (title.trim().to_string(), body.trim().to_string());
    }

    let mut paragraphs = text.split("\n\n");
    let title = paragraphs.next().unwrap_or_default().trim().to_string();
    let body = paragraphs.collect::<Vec<_>>().join("\n\n").trim().to_string();
    (title, body)
}

/// Generates notes from templates using a text model
pub struct ContentGenerator {
    config: Arc<Config>,
    templates: Arc<TemplateStore>,
    model: Box<dyn TextModel>,
    store: RecordStore,
    rng: StdRng,
}

impl ContentGenerator {
    pub fn new(config: Arc<Config>, templates: Arc<TemplateStore>, model: Box<dyn TextModel>) -> Self {
        let store = RecordStore::new(config.output_dir());
        Self {
            config,
            templates,
            model,
            store,
            rng: StdRng::from_entropy(),
        }
    }

    /// Production wiring: templates from disk and the Anthropic model
    ///
    /// # Errors
    ///
    /// Fails if the template document cannot be loaded, a content type
    /// references an unknown template, or the API key variable is unset.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let templates = TemplateStore::load_from_path(&config.templates_path())?;
        templates.verify_references(&config.content_strategy)?;
        info!(
            templates = templates.len(),
            path = %config.templates_path().display(),
            "Loaded templates"
        );

        let model = AnthropicModel::new(&config.ai, config.api_key()?)?;
        Ok(Self::new(config, Arc::new(templates), Box::new(model)))
    }

    /// Replace the entropy-seeded RNG with a deterministic one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Draw a content type according to the configured weights
    pub fn select_content_type(&mut self) -> Result<ContentType> {
        let types = &self.config.content_strategy.content_types;
        let weights: Vec<f64> = types.iter().map(|ct| ct.weight).collect();
        weighted_choice(types, &weights, &mut self.rng).cloned()
    }

    /// Pick one of the content type's templates uniformly
    pub fn select_template(&mut self, content_type: &ContentType) -> Result<Template> {
        let id = content_type.templates.choose(&mut self.rng).ok_or_else(|| {
            ConfigError::UnknownTemplate(format!("<none listed for '{}'>", content_type.name))
        })?;
        self.templates.get(id).cloned()
    }

    pub fn generate_hashtags(&mut self, count: usize) -> Vec<String> {
        pick_hashtags(&self.config.hashtags, count, &mut self.rng)
    }

    /// Build the instruction sent to the model
    pub fn build_prompt(&mut self, template: &Template, content_type: &ContentType) -> Result<String> {
        let title = fill_title_pattern(&template.title_pattern, self.templates.variables(), &mut self.rng)?;
        Ok(render_prompt(&self.config.product, &content_type.name, &title, template))
    }

    /// Select, prompt, call the model and parse the reply
    ///
    /// # Errors
    ///
    /// Returns an error if selection fails or the model call fails; no
    /// content is produced in that case.
    pub async fn generate_content(&mut self, test_mode: bool) -> Result<GeneratedContent> {
        let content_type = self.select_content_type()?;
        let template = self.select_template(&content_type)?;
        info!(
            content_type = %content_type.name,
            template = %template.name,
            "Generating content"
        );

        let prompt = self.build_prompt(&template, &content_type)?;
        debug!(model = %self.model.name(), "Calling text model");

        let reply = self.model.complete(&prompt).await.map_err(|e| {
            error!("Content generation failed: {}", e);
            e
        })?;

        let (title, body) = parse_reply(&reply);
        let tags = self.generate_hashtags(DEFAULT_HASHTAG_COUNT);

        info!(title = %title, body_chars = body.chars().count(), "Content generated");

        Ok(GeneratedContent {
            title,
            content: body,
            tags,
            content_type: content_type.name,
            template: template.name,
            generated_at: Local::now(),
            test_mode,
        })
    }

    /// Persist one generated note under the output directory
    pub fn save_content(&self, content: &GeneratedContent, filename: Option<&str>) -> Result<PathBuf> {
        let path = self.store.save_content(content, filename)?;
        info!(path = %path.display(), "Content saved");
        Ok(path)
    }
}

fn render_prompt(product: &ProductConfig, content_type: &str, title: &str, template: &Template) -> String {
    format!(
        r#"你是一个专业的小红书营销文案专家，擅长创作高互动量的内容。请全程使用简体中文写作。

【产品信息】
名称：{name}
网址：{url}
简介：{description}
功能：{features}
目标用户：{users}
核心痛点：{pains}

【内容类型】{content_type}

【模板信息】
标题参考：{title}
内容结构：{structure}
写作风格：{style}
表情符号密度：{emoji}

【要求】
1. 标题：{title_min}-{title_max}字，吸引眼球，可以使用数字或疑问句
2. 正文：{body_min}-{body_max}字，分段清晰，多用emoji（根据密度要求）
3. 风格：口语化、接地气、有共鸣感、真诚
4. 避免：绝对化用语（最好、第一）、夸大宣传、虚假承诺
5. 重点：突出产品价值，解决用户痛点，提供实用信息

【参考优秀案例风格】
"做了半年Temu，终于找到宝藏工具了！🎉

之前每天光是上架产品就要花3个小时😭
- 手动复制粘贴商品信息
- 一个个核对价格
- 库存变动要手动更新

直到我发现了这个神器！⚡️

现在效率提升10倍，每天多出2小时去优化策略💪"

请生成一篇完整的小红书笔记内容，包括：
1. 标题（不要加"标题："前缀）
2. 正文内容
3. 不需要包含话题标签（我会单独添加）

注意：
- 不要使用markdown格式
- 直接输出纯文本
- 标题和正文之间用空行分隔
- 保持真实感，像真人在分享经验
"#,
        name = product.name,
        url = product.url,
        description = product.description,
        features = product.features.join("、"),
        users = product.target_users.join("、"),
        pains = product.pain_points.join("、"),
        content_type = content_type,
        title = title,
        structure = template.content_structure.join("、"),
        style = template.style,
        emoji = template.emoji_density,
        title_min = TITLE_MIN_CHARS,
        title_max = TITLE_MAX_CHARS,
        body_min = BODY_MIN_CHARS,
        body_max = BODY_MAX_CHARS,
    )
}
