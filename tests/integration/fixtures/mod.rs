// Known chapter bodies and their expected rewrites
// WHY: Golden comparisons need deterministic input/output pairs

/// Chapter with one long paragraph, one short paragraph, and a heading
pub const CHAPTER_LONG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Глава 1</title></head>
<body>
<h1>Глава 1</h1>
<p class="text">Он вошёл в комнату. В комнате было темно. Т.е. совсем темно. Он зажёг свечу.</p>
<p class="text">Коротко.</p>
</body>
</html>
"#;

/// CHAPTER_LONG split with a threshold of 8 words
pub const CHAPTER_LONG_SPLIT_8: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Глава 1</title></head>
<body>
<h1>Глава 1</h1>
<p class="text">Он вошёл в комнату. В комнате было темно.</p>
<p class="text">Т.е. совсем темно. Он зажёг свечу.</p>
<p class="text">Коротко.</p>
</body>
</html>
"#;

/// Print-style chapter where one logical paragraph is broken across lines
pub const CHAPTER_BROKEN_LINES: &str = r#"<html><body>
<p class="calibre1">Mr. Holmes looked up. He said</p>
<p class="calibre1">nothing at all. Then he smiled.</p>
<p class="calibre1">We left together.</p>
<div class="note"><p>A note. With two sentences.</p></div>
</body></html>
"#;

/// CHAPTER_BROKEN_LINES merged, then split with a threshold of 6 words
pub const CHAPTER_BROKEN_LINES_MERGED_6: &str = r#"<html><body>
<p class="calibre1">Mr. Holmes looked up. He said nothing at all.</p>
<p class="calibre1">Then he smiled. We left together.</p>
<div class="note"><p>A note. With two sentences.</p></div>
</body></html>
"#;

/// Chapter with dialogue inside quotes and inline markup
pub const CHAPTER_DIALOGUE: &str = r#"<html><body>
<p>«Ты придёшь? Я жду». Она кивнула. <em>Потом</em> ушла. Дверь закрылась.</p>
</body></html>
"#;

/// CHAPTER_DIALOGUE split with a threshold of 3 words
pub const CHAPTER_DIALOGUE_SPLIT_3: &str = r#"<html><body>
<p>«Ты придёшь? Я жду».</p>
<p>Она кивнула. <em>Потом</em> ушла.</p>
<p>Дверь закрылась.</p>
</body></html>
"#;

/// Plain-text book with CRLF line endings
pub const PLAIN_TEXT_BOOK: &str = "Chapter One\r\n\r\nThe rain had stopped. The street was empty. Nobody came.\r\nShort line.\r\n";

/// PLAIN_TEXT_BOOK split with a threshold of 4 words
pub const PLAIN_TEXT_BOOK_SPLIT_4: &str =
    "Chapter One\r\n\r\nThe rain had stopped.\r\nThe street was empty.\r\nNobody came.\r\nShort line.\r\n";
