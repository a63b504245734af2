use extract::ParameterBag;

use crate::error::RenderError;
use crate::template::Template;

/// Fills every `{name}` placeholder of `template` with the display form of
/// `params[name]`.
///
/// Values are spliced in as text. Nothing is quoted or escaped beyond the
/// quote characters already written in the template, so the result carries
/// whatever the user typed.
pub fn render(template: &Template, params: &ParameterBag) -> Result<String, RenderError> {
    let mut sql = template.sql.clone();
    for name in &template.parameters {
        let value = params
            .get(name)
            .ok_or_else(|| RenderError::MissingParameter {
                template: template.id.clone(),
                name: name.clone(),
            })?;
        sql = sql.replace(&format!("{{{name}}}"), &value.to_string());
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TemplateCatalog;
    use extract::{keys, ParamValue};

    fn bag(entries: &[(&str, ParamValue)]) -> ParameterBag {
        entries.iter().cloned().collect()
    }

    #[test]
    fn parameterless_template_round_trips() {
        let catalog = TemplateCatalog::retail();
        for template in catalog.iter().filter(|t| !t.has_parameters()) {
            let sql = render(template, &ParameterBag::new()).unwrap();
            assert_eq!(sql, template.sql);
        }
    }

    #[test]
    fn customer_name_is_quoted_by_template() {
        let catalog = TemplateCatalog::retail();
        let template = catalog.get(1).unwrap();
        let params = bag(&[(keys::CUSTOMER_LAST_NAME, ParamValue::Text("Smith".into()))]);
        let sql = render(template, &params).unwrap();
        assert!(sql.ends_with("WHERE c.last_name = 'Smith'"), "{sql}");
        assert!(!sql.contains('{'));
    }

    #[test]
    fn numbers_use_natural_form() {
        let catalog = TemplateCatalog::retail();
        let (_, price) = catalog.find("products_above_price").unwrap();
        let sql = render(price, &bag(&[(keys::MIN_PRICE, ParamValue::Float(50.0))])).unwrap();
        assert_eq!(sql, "SELECT name, price, category FROM products WHERE price > 50.0");

        let (_, stock) = catalog.find("low_stock_items").unwrap();
        let sql = render(stock, &bag(&[(keys::THRESHOLD, ParamValue::Integer(10))])).unwrap();
        assert!(sql.ends_with("WHERE i.quantity < 10"), "{sql}");
    }

    #[test]
    fn like_pattern_keeps_wildcards() {
        let catalog = TemplateCatalog::retail();
        let template = catalog.get(2).unwrap();
        let params = bag(&[(keys::PRODUCT_NAME, ParamValue::Text("headphones".into()))]);
        let sql = render(template, &params).unwrap();
        assert!(sql.ends_with("WHERE p.name LIKE '%headphones%'"), "{sql}");
    }

    #[test]
    fn values_are_not_escaped() {
        let catalog = TemplateCatalog::retail();
        let template = catalog.get(1).unwrap();
        let params = bag(&[(keys::CUSTOMER_LAST_NAME, ParamValue::Text("O'Brien".into()))]);
        let sql = render(template, &params).unwrap();
        assert!(sql.ends_with("c.last_name = 'O'Brien'"), "{sql}");
    }

    #[test]
    fn repeated_placeholders_are_all_replaced() {
        let template = Template::new(
            "twice",
            "d",
            "SELECT * FROM t WHERE a = '{x}' OR b = '{x}'",
            ["x"],
        )
        .unwrap();
        let sql = render(&template, &bag(&[("x", ParamValue::Text("v".into()))])).unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = 'v' OR b = 'v'");
    }

    #[test]
    fn extra_parameters_are_ignored() {
        let catalog = TemplateCatalog::retail();
        let template = catalog.get(6).unwrap();
        let params = bag(&[(keys::THRESHOLD, ParamValue::Integer(3))]);
        assert_eq!(render(template, &params).unwrap(), template.sql);
    }

    #[test]
    fn missing_parameter_fails() {
        let catalog = TemplateCatalog::retail();
        let template = catalog.get(4).unwrap();
        assert_eq!(
            render(template, &ParameterBag::new()),
            Err(RenderError::MissingParameter {
                template: "products_in_category".into(),
                name: "category".into()
            })
        );
    }
}
