pub const BLOCK_TEMPLATE: &str = "<div class=box><span>hello</span><img src=x></div>";

pub fn make_blocks(blocks: usize) -> String {
    let mut html = String::with_capacity(BLOCK_TEMPLATE.len() * blocks + 16);
    html.push_str("<main>");
    for _ in 0..blocks {
        html.push_str(BLOCK_TEMPLATE);
    }
    html.push_str("</main>");
    html
}

/// A keyed list of `items` entries, rotated left by `rotate` positions.
pub fn make_keyed_list(items: usize, rotate: usize) -> String {
    let mut html = String::with_capacity(items * 40 + 16);
    html.push_str("<ul>");
    for i in 0..items {
        let key = (i + rotate) % items.max(1);
        html.push_str(&format!("<li data-key=\"k{key}\">item {key}</li>"));
    }
    html.push_str("</ul>");
    html
}
