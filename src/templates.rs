use handlebars::Handlebars;
use serde_json::Value;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

// Notification messages (the subject is prepended by the sink)
const TREND: &str = "has changed by {{change}}% in the last hour.";
const BUY: &str = "is at or below the buy price of {{currency}} {{price}}";
const SELL: &str = "is at or above the sell price of {{currency}} {{price}}";
const CURRENT_PRICE: &str = "current price is {{currency}} {{price}}";
const PRICE_UNAVAILABLE: &str = "price is currently unavailable";

// Command replies
const ASSET_LIST: &str =
    "Currently monitored assets: {{#each assets}}{{#unless @first}}, {{/unless}}{{label}}{{/each}}";
const ASSET_ALL: &str =
    "All assets: {{#each assets}}{{#unless @first}}, {{/unless}}{{label}}: {{amount}}{{/each}}";
const ASSET_DETAIL: &str = "Asset: {{label}} - Amount: {{amount}}";
const PORTFOLIO_VALUE: &str = "Current portfolio value: {{currency}} {{total}}";

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();
    // plain text, not HTML
    hb.register_escape_fn(handlebars::no_escape);

    let templates = [
        ("notify/trend", TREND),
        ("notify/buy", BUY),
        ("notify/sell", SELL),
        ("notify/current_price", CURRENT_PRICE),
        ("notify/price_unavailable", PRICE_UNAVAILABLE),
        ("reply/asset_list", ASSET_LIST),
        ("reply/asset_all", ASSET_ALL),
        ("reply/asset_detail", ASSET_DETAIL),
        ("reply/portfolio_value", PORTFOLIO_VALUE),
    ];

    for (name, src) in templates {
        hb.register_template_string(name, src)
            .unwrap_or_else(|e| panic!("template {name}: {e}"));
    }

    Arc::new(hb)
}

pub fn render(hbs: &Hbs, tpl: &str, ctx: &Value) -> String {
    hbs.render(tpl, ctx)
        .unwrap_or_else(|e| format!("template error: {e}"))
}

pub fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trend_message_keeps_sign_and_two_decimals() {
        let hbs = build_handlebars();
        let msg = render(&hbs, "notify/trend", &json!({ "change": fmt2(-5.2) }));
        assert_eq!(msg, "has changed by -5.20% in the last hour.");
    }

    #[test]
    fn lists_are_comma_separated() {
        let hbs = build_handlebars();
        let msg = render(
            &hbs,
            "reply/asset_list",
            &json!({ "assets": [{ "label": "Bitcoin (BTC)" }, { "label": "Ether (ETH)" }] }),
        );
        assert_eq!(msg, "Currently monitored assets: Bitcoin (BTC), Ether (ETH)");
    }

    #[test]
    fn no_html_escaping() {
        let hbs = build_handlebars();
        let msg = render(&hbs, "reply/asset_detail", &json!({ "label": "A&B <X>", "amount": "1" }));
        assert_eq!(msg, "Asset: A&B <X> - Amount: 1");
    }
}
