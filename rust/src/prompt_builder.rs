use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "AI SaaS")]
    AiSaas,
    #[serde(rename = "Productivity Tools")]
    ProductivityTools,
    #[serde(rename = "Startup")]
    Startup,
    #[serde(rename = "E-Commerce")]
    ECommerce,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::AiSaas,
        Category::ProductivityTools,
        Category::Startup,
        Category::ECommerce,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::AiSaas => "AI SaaS",
            Category::ProductivityTools => "Productivity Tools",
            Category::Startup => "Startup",
            Category::ECommerce => "E-Commerce",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|category| category.label() == label)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|category| category.label()).collect()
    }
}

// Callers reject empty ideas first.
pub fn build_prompt(idea: &str, category: Category) -> String {
    format!(
        r#"
You are a world-class front-end designer. Create a **realistic, production-quality website** in pure **HTML + Tailwind CSS** for a {category} product called "{idea}".

The website should look **like a real startup or SaaS company site**, not a demo.

Requirements:
1. Structure:
   - **Navbar:** logo, nav links, call-to-action button.
   - **Hero Section:** catchy headline, short subtext, and a strong CTA button.
   - **Features Section:** 3–4 elegant cards with icons, short titles, and descriptions.
   - **Testimonials Section:** 2–3 user testimonials with name, role, and quote.
   - **Pricing Section:** 2–3 pricing cards with plan names, prices, and features.
   - **Call-to-Action (CTA) Section:** a bold invitation to try or sign up.
   - **Footer:** logo, quick links, and social icons.

2. Design Style:
   - Use **Tailwind CSS** only (no inline styles or JS).
   - Choose a **modern SaaS aesthetic**: rounded corners, clean spacing, and balanced layout.
   - Use **beautiful gradients**, subtle shadows, and pastel or muted colors.
   - Typography: readable sans-serif (e.g., Inter, Poppins, or Open Sans).
   - All images should use **placeholder URLs** (like via Unsplash).

3. Responsiveness:
   - The layout must work seamlessly on mobile, tablet, and desktop.
   - Use responsive classes (e.g., grid-cols-1 md:grid-cols-3).

4. Output:
   - Output only **valid HTML code** (no Markdown or explanations).
   - The HTML should be ready to copy and open in a browser.

Goal:
Create a website that feels like a **real, professional, fully built product landing page**, suitable for a live SaaS or startup website.
"#,
        category = category.label(),
        idea = idea,
    )
}

#[cfg(test)]
mod tests {
    use super::{build_prompt, Category};

    #[test]
    fn prompt_embeds_idea_and_category_verbatim() {
        for category in Category::ALL {
            let out = build_prompt("AI Resume Builder", category);
            assert!(out.contains(r#"product called "AI Resume Builder""#));
            assert!(out.contains(&format!("for a {} product", category.label())));
            assert!(out.contains("Output only **valid HTML code**"));
        }
    }

    #[test]
    fn prompt_is_deterministic_and_unescaped() {
        let idea = r#"<b>Tom & "Jerry"</b>"#;
        let first = build_prompt(idea, Category::Startup);
        let second = build_prompt(idea, Category::Startup);
        assert_eq!(first, second);
        assert!(first.contains(idea));

        let other = build_prompt("Other", Category::Startup);
        assert_eq!(
            first.replace(idea, "Other"),
            other,
            "only the interpolated idea should differ"
        );
    }

    #[test]
    fn category_labels_round_trip_and_default() {
        assert_eq!(Category::default(), Category::AiSaas);
        assert_eq!(
            Category::labels(),
            vec!["AI SaaS", "Productivity Tools", "Startup", "E-Commerce"]
        );
        assert_eq!(Category::from_label(" E-Commerce "), Some(Category::ECommerce));
        assert_eq!(Category::from_label("Gaming"), None);

        let json = serde_json::to_string(&Category::ProductivityTools).expect("serialize");
        assert_eq!(json, r#""Productivity Tools""#);
    }
}
