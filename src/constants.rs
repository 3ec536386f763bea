pub const ANALYSIS_API_KEY_ENV_NAME: &str = "ADSMITH_ANALYSIS_API_KEY";
pub const COPY_API_KEY_ENV_NAME: &str = "ADSMITH_COPY_API_KEY";
pub const IMAGE_API_KEY_ENV_NAME: &str = "ADSMITH_IMAGE_API_KEY";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_IMAGES: usize = 20;
pub const MAX_PARAGRAPHS: usize = 10;
pub const MIN_PARAGRAPH_CHARS: usize = 20;
pub const MAX_COPY_CANDIDATES: usize = 20;
pub const MAX_BANNERS_PER_SIZE: usize = 10;
pub const MAX_COLLAGE_CELLS: usize = 5;

/// Substrings marking decorative `img` sources.
pub const EXCLUDED_IMAGE_MARKERS: [&str; 3] = ["icon", "logo", "sprite"];

pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
pub const DEFAULT_IMAGE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";

pub(crate) const COLOR_PROMPT: &str = r##"
Analyze the attached image, a screenshot of a website, and pick three colors:

1. main: the dominant color of the site
2. accent: the eye-catching color used by buttons and calls to action
3. base: the background or foundation color

Answer only with JSON in exactly this form, without any other text:
{
  "main": "#RRGGBB",
  "accent": "#RRGGBB",
  "base": "#RRGGBB"
}"##;

pub(crate) const MARKETING_PROMPT_TEMPLATE: &str = r#"
Analyze the following website from a marketing point of view.

# Website
- Title: {title}
- Description: {description}
- Headings (H1): {h1}
- Headings (H2): {h2}
- Body: {paragraphs}
{category}
Answer only with JSON containing these fields, without any other text:

{
  "competitors": ["competitor 1", "competitor 2", "competitor 3"],
  "strengths": ["strength 1", "strength 2", "strength 3"],
  "target": "detailed target persona (gender, age range, pains, problems)",
  "brandTone": "brand tone (for example trust, friendliness, innovation)"
}

Keep the analysis realistic for the actual business environment."#;

pub(crate) const COPY_RULES: &str = r#"
# Rules
1. 15 to 30 characters, easy to read
2. Appeal to the emotions of the target
3. State the strengths clearly
4. Include a call to action
5. Sound natural
6. Pick words with visual impact, the copy will be placed on a banner
7. Stand out from the competitors

# Output
Answer only with a numbered list of copies:

1. copy one
2. copy two
3. copy three
...

No explanations, only the copies."#;

pub(crate) const REFINE_PROMPT_TEMPLATE: &str = r#"
Improve the following advertising copy based on the feedback.

# Original copy
{copy}

# Feedback
{feedback}

# Marketing
- Target: {target}
- Brand tone: {brand_tone}

# Output
Answer only with the improved copy, no explanations."#;
