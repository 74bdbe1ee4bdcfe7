use rust_embed::RustEmbed;
use tera::{Context, Tera};

use crate::web::models::PageContext;

pub const PREDICT_TEMPLATE: &str = "predict.html";
pub const ABOUT_TEMPLATE: &str = "about.html";

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

/// Builds the template set from the files compiled into the binary.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut sources = Vec::new();
    for name in Templates::iter() {
        let file = Templates::get(&name)
            .ok_or_else(|| tera::Error::msg(format!("embedded template {name} vanished")))?;
        let body = String::from_utf8(file.data.into_owned())
            .map_err(|e| tera::Error::msg(format!("template {name} is not UTF-8: {e}")))?;
        sources.push((name.to_string(), body));
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(sources)?;
    Ok(tera)
}

pub fn render(tera: &Tera, template: &str, page: &PageContext) -> Result<String, tera::Error> {
    let context = Context::from_serialize(page)?;
    tera.render(template, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::{PredictionOutcome, Salary};
    use crate::web::models::Mode;

    #[test]
    fn test_all_templates_load() {
        let tera = load_templates().unwrap();
        let names: Vec<_> = tera.get_template_names().collect();
        for expected in ["base.html", PREDICT_TEMPLATE, ABOUT_TEMPLATE] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_predict_page_renders_form_defaults() {
        let tera = load_templates().unwrap();
        let html = render(&tera, PREDICT_TEMPLATE, &PageContext::new(Mode::SinglePrediction)).unwrap();

        assert!(html.contains("🔮 Predict Salary"));
        assert!(html.contains(r#"name="years" min="0" max="50""#));
        assert!(html.contains(r#"<option value="Quality Control" selected>"#));
        assert!(!html.contains("Estimated Monthly Salary"));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_success_and_fatal_states() {
        let tera = load_templates().unwrap();

        let mut page = PageContext::new(Mode::SinglePrediction);
        page.outcome = Some(PredictionOutcome::from_result(Ok(Salary::new(41250.75))));
        page.celebrate = true;
        let html = render(&tera, PREDICT_TEMPLATE, &page).unwrap();
        assert!(html.contains("Prediction successful!"));
        assert!(html.contains("₹ 41,250.75"));
        assert!(html.contains("balloons"));

        let mut page = PageContext::new(Mode::SinglePrediction);
        page.model_error = Some("Failed to read model artifact".to_string());
        let html = render(&tera, PREDICT_TEMPLATE, &page).unwrap();
        assert!(html.contains("<fieldset disabled>"));
        assert!(html.contains("status-fatal"));
    }

    #[test]
    fn test_about_page() {
        let tera = load_templates().unwrap();
        let html = render(&tera, ABOUT_TEMPLATE, &PageContext::new(Mode::AboutApp)).unwrap();
        assert!(html.contains("About This Project"));
        assert!(html.contains("Linear Regression"));
        assert!(html.contains("Created by <strong>Yasir Khan</strong> as a mini ML project."));
        assert!(html.contains("💼 Salary Prediction App by Yasir</h1>"));
        assert!(!html.contains("<form"));
    }
}
