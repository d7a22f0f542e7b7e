/// A small product listing page with the usual HTML sloppiness.
pub const LISTING_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Catalogue page 3 of 12</title></head>
<body>
  <div id="products">
    <div class="product" data-sku="A-100">
      <h2><a href="/p/100">Kettle</a></h2>
      <span class="price">&pound;24.99</span>
    </div>
    <div class="product" data-sku="B-200">
      <h2><a href="/p/200">Toaster &amp; Grill</a></h2>
      <span class="price">&pound;39.50</span>
    </div>
    <div class="product" data-sku="C-300">
      <h2><a href="/p/300">Blender</a></h2>
      <p>Out of stock
    </div>
  </div>
  <!-- rendered in 12ms -->
</body>
</html>"#;

/// An Atom feed using a default namespace and a prefixed extension namespace.
pub const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title>Release notes</title>
  <entry>
    <title>Version 1.2</title>
    <link href="http://example.com/1.2"/>
    <media:thumbnail url="http://example.com/1.2.png"/>
  </entry>
  <entry>
    <title>Version 1.3</title>
    <link href="http://example.com/1.3"/>
  </entry>
</feed>"#;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";

/// Not well-formed: `<b>` is never closed.
pub const MALFORMED: &str = "<a><b>hello</a>";
