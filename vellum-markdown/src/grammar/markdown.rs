//! The Markdown grammar: block structure, inline structure, the title
//! block, and the reference-key / note-block productions used by the
//! preprocessing passes.
//!
//! Block content captured for list items, block quotes and notes is handed
//! back through the re-entry helpers in the parent module, which run the
//! same grammar over the captured text with the shared `ParserState`.

use crate::state::ParserState;

peg::parser! {
    pub(crate) grammar markdown_parser(state: &mut ParserState) for str {
        use vellum_ast::{
            compactify, join_with_sep, normalize_spaces, remove_leading_trailing_space,
            strip_trailing_newlines, Alignment, Block, Inline, ListAttributes,
            ListNumberDelim, ListNumberStyle, QuoteType,
        };

        use crate::grammar::QuoteContext;
        use crate::state::ParserContext;

        // ---------------------------------------------------------------
        // Low-level tokens
        // ---------------------------------------------------------------

        rule sp() = quiet!{ [' ' | '\t']* }
        rule space_char() = quiet!{ [' ' | '\t'] }
        rule blank_line() = quiet!{ [' ' | '\t']* "\n" }
        rule blank_lines() = quiet!{ blank_line()+ }

        /// Rest of the current line, consuming the newline.
        rule any_line() -> &'input str
        = l:$([^ '\n']*) "\n" { l }

        /// A newline folding a definition onto the next line. Must not open
        /// a blank line.
        rule fold_newline() = "\n" !blank_line()

        /// Up to tab_stop - 1 leading spaces.
        rule non_indent_spaces() -> usize
        = sps:$([' ']*)
        {? if sps.len() < state.options.tab_stop { Ok(sps.len()) } else { Err("non-indent space") } }

        /// Exactly one level of indentation: a tab, or tab_stop spaces.
        rule indent_spaces() = quiet!{ "\t" / spaces_exactly(state.options.tab_stop) }

        rule spaces_exactly(n: usize)
        = zero_spaces(n)
        / [' '] spaces_exactly(n - 1)

        rule zero_spaces(n: usize)
        = {? if n == 0 { Ok(()) } else { Err("space") } }

        rule alphanumeric()
        = c:[_] {? if c.is_alphanumeric() { Ok(()) } else { Err("alphanumeric") } }

        // Mode guards. Extensions fail in strict mode; raw HTML/LaTeX
        // recognition honors the parse_raw flag.
        rule not_strict()
        = {? if state.options.strict { Err("strict mode") } else { Ok(()) } }
        rule is_strict()
        = {? if state.options.strict { Ok(()) } else { Err("extended mode") } }
        rule smart_on()
        = {? if state.options.smart { Ok(()) } else { Err("smart typography") } }
        rule parse_raw_on()
        = {? if state.options.parse_raw { Ok(()) } else { Err("raw parsing disabled") } }

        // ---------------------------------------------------------------
        // Entry rules
        // ---------------------------------------------------------------

        pub(crate) rule blocks() -> Vec<Block>
        = bs:block()* ![_] { bs }

        pub(crate) rule inlines() -> Vec<Inline>
        = is:inline(QuoteContext::None)* ![_] { is }

        /// Optional leading title block: `%` title, `%` authors, `%` date.
        /// Returns the metadata plus the unconsumed remainder of the input.
        pub(crate) rule title_block() -> ((Vec<Inline>, Vec<String>, String), &'input str)
        = not_strict()
          title:title_line() authors:authors_line()? date:date_line()? blank_line()*
          rest:$([_]*)
        { ((title, authors.unwrap_or_default(), date.unwrap_or_default()), rest) }

        rule title_line() -> Vec<Inline>
        = "%" sp() t:$([^ '\n']+) "\n"
        {?
            let text = t.trim();
            if text.is_empty() {
                Err("empty title line")
            } else {
                Ok(normalize_spaces(crate::grammar::parse_inlines_from(state, text)))
            }
        }

        rule authors_line() -> Vec<String>
        = "%" sp() l:$([^ '\n']*) "\n"
        {
            l.split([';', ','])
                .map(|author| crate::entities::decode_character_references(author.trim()))
                .filter(|author| !author.is_empty())
                .collect()
        }

        rule date_line() -> String
        = "%" sp() l:$([^ '\n']*) "\n"
        { crate::entities::decode_character_references(l.trim()) }

        /// A reference-style link definition, for pass 1. Returns the
        /// normalizable label, the target, and the unconsumed remainder.
        pub(crate) rule reference_key() -> (String, (String, String), &'input str)
        = non_indent_spaces() key_label_guard() lab:bracketed_raw() ":" sp() fold_newline()? sp()
          src:key_source() tit:key_title()? sp() blank_lines()
          rest:$([_]*)
        { (lab, (src, tit.unwrap_or_default()), rest) }

        // In strict mode there are no footnotes, so `[^x]:` is an ordinary
        // key; otherwise it belongs to pass 2.
        rule key_label_guard()
        = is_strict()
        / !"[^"

        rule key_source() -> String
        = "<" s:$([^ '>' | ' ' | '\t' | '\n']*) ">" { s.to_string() }
        / s:$([^ ' ' | '\t' | '\n']+) { s.to_string() }

        rule key_title() -> String
        = sp() fold_newline()? sp() t:(dq_title() / sq_title() / paren_title()) { t }

        rule dq_title() -> String
        = "\"" t:$((!dq_close() !("\n" blank_line()) [^ '"'])*) dq_close() { t.to_string() }
        rule dq_close() = "\"" sp() &("\n" / ![_])

        rule sq_title() -> String
        = "'" t:$((!sq_close() !("\n" blank_line()) [^ '\''])*) sq_close() { t.to_string() }
        rule sq_close() = "'" sp() &("\n" / ![_])

        rule paren_title() -> String
        = "(" t:$([^ ')' | '\n']*) ")" { t.to_string() }

        /// A footnote definition, for pass 2. Continuation chunks after a
        /// blank line must be indented one tab stop.
        pub(crate) rule note_block() -> (String, String, &'input str)
        = not_strict() non_indent_spaces()
          "[^" id:$([^ ']' | ' ' | '\t' | '\n']+) "]" ":" sp() blank_line()?
          first:note_chunk()
          more:note_cont_chunk()*
          blank_lines()?
          rest:$([_]*)
        {
            tracing::debug!(id, "note block");
            (id.to_string(), format!("{first}{}", more.concat()), rest)
        }

        rule note_line() -> String
        = !blank_line() !(non_indent_spaces() "[^") indent_spaces()? l:any_line()
        { format!("{l}\n") }

        rule note_chunk() -> String
        = lines:note_line()+ { lines.concat() }

        rule note_cont_chunk() -> String
        = b:$(blank_lines()) &indent_spaces() lines:note_line()+
        { format!("{}{}", "\n".repeat(b.matches('\n').count()), lines.concat()) }

        // ---------------------------------------------------------------
        // Blocks
        // ---------------------------------------------------------------

        rule block() -> Block
        = header()
        / table()
        / code_block()
        / hrule()
        / list()
        / block_quote()
        / html_block()
        / latex_environment_block()
        / para()
        / plain()
        / null_block()

        rule header() -> Block
        = atx_header()
        / setext_header()

        // `#.` and `#)` are ordered-list markers, not headers.
        rule atx_header() -> Block
        = hashes:$("#"*<1,6>) !['.' | ')'] sp()
          content:(!atx_close() i:inline(QuoteContext::None) { i })*
          atx_close()
        { Block::Header(hashes.len() as i32, normalize_spaces(content)) }

        rule atx_close() = quiet!{ "#"* blank_lines() }

        rule setext_header() -> Block
        = content:(!"\n" i:inline(QuoteContext::None) { i })+ "\n"
          level:setext_underline() blank_lines()
        { Block::Header(level, normalize_spaces(content)) }

        rule setext_underline() -> i32
        = "=" "="* { 1 }
        / "-" "-"* { 2 }

        rule hrule() -> Block
        = sp()
          ( "*" (sp() "*")*<2,>
          / "-" (sp() "-")*<2,>
          / "_" (sp() "_")*<2,>
          )
          sp() "\n" blank_lines()?
        { Block::HorizontalRule }

        rule code_block() -> Block
        = chunks:code_chunk()+ blank_lines()?
        { Block::CodeBlock(strip_trailing_newlines(&chunks.concat()).to_string()) }

        rule code_chunk() -> String
        = indented_code_line()
        / b:$(blank_lines()) l:indented_code_line()
          { format!("{}{l}", "\n".repeat(b.matches('\n').count())) }

        rule indented_code_line() -> String
        = indent_spaces() l:any_line() { format!("{l}\n") }

        // -- Lists ------------------------------------------------------

        rule list() -> Block
        = bullet_list()
        / ordered_list()
        / definition_list()

        rule bullet_list() -> Block
        = items:bullet_list_item()+
        { Block::BulletList(compactify(items)) }

        rule bullet_list_item() -> Vec<Block>
        = bullet_list_start() raw:raw_list_item() conts:list_continuation()*
        { crate::grammar::parse_list_item_blocks(state, &format!("{raw}{}", conts.concat())) }

        // The optional newline lets a fresh marker start an item when a
        // Plain inside a list item stopped just short of it.
        rule bullet_list_start()
        = "\n"? non_indent_spaces() !hrule() ['*' | '+' | '-'] space_char() sp()

        /// Marker-line text, continuation lines (one indent level stripped),
        /// and trailing blank lines, as raw text for re-parsing.
        rule raw_list_item() -> String
        = first:any_line() more:list_line()* blanks:$(blank_line()*)
        {
            format!(
                "{first}\n{}{}",
                more.concat(),
                "\n".repeat(blanks.matches('\n').count())
            )
        }

        rule list_line() -> String
        = !blank_line() !list_start_peek() indent_spaces()? l:any_line()
        { format!("{l}\n") }

        rule list_continuation() -> String
        = &indent_spaces() lines:list_line()+ blanks:$(blank_line()*)
        {
            format!(
                "{}{}",
                lines.concat(),
                "\n".repeat(blanks.matches('\n').count())
            )
        }

        rule list_start_peek()
        = bullet_list_start()
        / _m:ordered_list_start_any() { }

        rule ordered_list() -> Block
        = first:ordered_first_item() rest:ordered_rest_item(first.1, first.2)*
        {
            let (start, style, delim, first_item) = first;
            let mut items = vec![first_item];
            items.extend(rest);
            Block::OrderedList(ListAttributes(start, style, delim), compactify(items))
        }

        rule ordered_first_item() -> (i32, ListNumberStyle, ListNumberDelim, Vec<Block>)
        = attrs:ordered_list_start_any() raw:raw_list_item() conts:list_continuation()*
        {
            (
                attrs.0,
                attrs.1,
                attrs.2,
                crate::grammar::parse_list_item_blocks(state, &format!("{raw}{}", conts.concat())),
            )
        }

        // Style mixing is forbidden: items after the first must repeat the
        // list's (style, delim) pair.
        rule ordered_rest_item(style: ListNumberStyle, delim: ListNumberDelim) -> Vec<Block>
        = _attrs:(a:ordered_list_start_any() {?
              if a.1 == style && a.2 == delim { Ok(a) } else { Err("list marker style") }
          })
          raw:raw_list_item() conts:list_continuation()*
        { crate::grammar::parse_list_item_blocks(state, &format!("{raw}{}", conts.concat())) }

        // `p. ` followed by a digit reads as a page number, never a list.
        rule ordered_list_start_any() -> (i32, ListNumberStyle, ListNumberDelim)
        = "\n"? non_indent_spaces() !("p. " ['0'..='9'])
          m:(strict_ordered_marker() / extended_ordered_marker())
        { m }

        // Strict Markdown only knows `digits.` and ignores the number.
        rule strict_ordered_marker() -> (i32, ListNumberStyle, ListNumberDelim)
        = is_strict() ['0'..='9']+ "." space_char() sp()
        { (1, ListNumberStyle::DefaultStyle, ListNumberDelim::DefaultDelim) }

        rule extended_ordered_marker() -> (i32, ListNumberStyle, ListNumberDelim)
        = not_strict()
          m:ordered_marker_token()
          marker_separator(crate::grammar::list_markers::requires_wide_separator(m.1, m.2, m.3))
        { (m.0, m.1, m.2) }

        rule ordered_marker_token() -> (i32, ListNumberStyle, ListNumberDelim, &'input str)
        = "(" t:marker_number() ")" { (t.0, t.1, ListNumberDelim::TwoParens, t.2) }
        / t:marker_number() ")" { (t.0, t.1, ListNumberDelim::OneParen, t.2) }
        / t:marker_number() "." { (t.0, t.1, ListNumberDelim::Period, t.2) }

        // Roman numerals win over single alphabetic markers, so `i.` is
        // roman one, not alpha nine.
        rule marker_number() -> (i32, ListNumberStyle, &'input str)
        = n:$(['0'..='9']+)
          {? n.parse::<i32>().map(|v| (v, ListNumberStyle::Decimal, n)).map_err(|_| "decimal marker") }
        / r:$(['i' | 'v' | 'x' | 'l' | 'c' | 'd' | 'm']+)
          {? crate::grammar::list_markers::roman_to_int(r).map(|v| (v, ListNumberStyle::LowerRoman, r)).ok_or("roman marker") }
        / r:$(['I' | 'V' | 'X' | 'L' | 'C' | 'D' | 'M']+)
          {? crate::grammar::list_markers::roman_to_int(r).map(|v| (v, ListNumberStyle::UpperRoman, r)).ok_or("roman marker") }
        / c:$(['a'..='z'])
          { (crate::grammar::list_markers::alpha_to_int(c.chars().next().unwrap_or('a')), ListNumberStyle::LowerAlpha, c) }
        / c:$(['A'..='Z'])
          { (crate::grammar::list_markers::alpha_to_int(c.chars().next().unwrap_or('A')), ListNumberStyle::UpperAlpha, c) }

        // Markers that read like initials or section numbers demand a tab
        // or two spaces; everything else takes a single space.
        rule marker_separator(wide: bool)
        = sep_wide(wide)
        / sep_narrow(wide)

        rule sep_wide(wide: bool)
        = ("\t" / "  ") sp() {? if wide { Ok(()) } else { Err("separator") } }

        rule sep_narrow(wide: bool)
        = space_char() sp() {? if wide { Err("separator") } else { Ok(()) } }

        rule definition_list() -> Block
        = not_strict() items:definition_list_item()+
        { Block::DefinitionList(items) }

        rule definition_list_item() -> (Vec<Inline>, Vec<Block>)
        = !blank_line() term:$([^ '\n']+) "\n" defs:def_raw_block()+
        {
            let term = normalize_spaces(crate::grammar::parse_inlines_from(state, term.trim_end()));
            let mut blocks = Vec::new();
            for def in &defs {
                blocks.extend(crate::grammar::parse_blocks_from(state, def));
            }
            (term, blocks)
        }

        rule def_raw_block() -> String
        = ":" def_indent() first:any_line() more:def_cont_line()* blanks:$(blank_line()*)
        {
            format!(
                "{first}\n{}{}",
                more.concat(),
                "\n".repeat(blanks.matches('\n').count())
            )
        }

        rule def_indent() = spaces_exactly(state.options.tab_stop.saturating_sub(1)) / "\t"

        rule def_cont_line() -> String
        = !blank_line() indent_spaces() l:any_line() { format!("{l}\n") }

        // -- Block quotes -----------------------------------------------

        rule block_quote() -> Block
        = raw:(emacs_box_quote() / email_block_quote())
        { Block::BlockQuote(crate::grammar::parse_blocks_from(state, &format!("{raw}\n"))) }

        rule email_block_quote() -> String
        = first:email_quote_head() more:email_quote_line()* blank_lines()?
        { format!("{first}{}", more.concat()) }

        rule email_quote_head() -> String
        = non_indent_spaces() ">" " "? l:any_line() { format!("{l}\n") }

        // Continuation lines need no `>`; the quote runs to a blank line.
        rule email_quote_line() -> String
        = email_quote_head()
        / !blank_line() l:any_line() { format!("{l}\n") }

        rule emacs_box_quote() -> String
        = not_strict() ",----" any_line()
          lines:(!"`----" l:emacs_box_line() { l })*
          "`----" any_line() blank_lines()?
        { lines.concat() }

        rule emacs_box_line() -> String
        = "|" " "? l:any_line() { format!("{l}\n") }

        // -- Raw HTML blocks --------------------------------------------

        rule html_block() -> Block
        = parse_raw_on() s:html_block_body() blank_lines()?
        { Block::RawHtml(s) }

        rule html_block_body() -> String
        = is_strict() r:html_block_element() t:$(sp() "\n"?)
          { format!("{r}{}", if t.contains('\n') { "\n" } else { "" }) }
        / not_strict() chunks:loose_html_chunk()+
          {
              let combined = chunks.concat();
              let trimmed = combined.trim_end_matches('\n');
              if trimmed.len() == combined.len() {
                  combined
              } else {
                  format!("{trimmed}\n")
              }
          }

        rule loose_html_chunk() -> String
        = t:(html_comment() / block_tag_single()) trail:$(sp() "\n"?)
        { format!("{t}{}", if trail.contains('\n') { "\n" } else { "" }) }

        rule block_tag_single() -> String
        = t:html_open_tag()
          {? if crate::grammar::is_html_block_tag(&t.1) { Ok(t.0.to_string()) } else { Err("block tag") } }
        / raw:$("</" html_tag_name() html_sp() ">")
          {? if crate::grammar::is_html_block_tag(&crate::grammar::tag_name(raw)) { Ok(raw.to_string()) } else { Err("block tag") } }

        rule html_block_element() -> String
        = html_comment()
        / t:html_open_tag()
          {?
              if crate::grammar::is_html_block_tag(&t.1)
                  && (t.0.ends_with("/>") || crate::grammar::is_void_tag(&t.1))
              {
                  Ok(t.0.to_string())
              } else {
                  Err("self-closing block tag")
              }
          }
        / open:(t:html_open_tag() {?
              if crate::grammar::is_html_block_tag(&t.1) && !t.0.ends_with("/>") {
                  Ok(t)
              } else {
                  Err("html block tag")
              }
          })
          inner:html_block_content(&open.1) close:html_end_tag_named(&open.1)
        { format!("{}{inner}{close}", open.0) }

        rule html_block_content(name: &str) -> String
        = parts:html_content_part(name)* { parts.concat() }

        rule html_content_part(name: &str) -> String
        = nested:html_nested_same(name) { nested }
        / run:$((!html_end_tag_named(name) !html_open_named(name) [_])+) { run.to_string() }

        rule html_nested_same(name: &str) -> String
        = open:html_open_named(name) inner:html_block_content(name) close:html_end_tag_named(name)
        { format!("{}{inner}{close}", open.0) }

        rule html_open_named(name: &str) -> (&'input str, String)
        = t:html_open_tag()
          {? if t.1.eq_ignore_ascii_case(name) && !t.0.ends_with("/>") { Ok(t) } else { Err("open tag") } }

        rule html_end_tag_named(name: &str) -> String
        = raw:$("</" html_tag_name() html_sp() ">")
          {?
              if crate::grammar::tag_name(raw).eq_ignore_ascii_case(name) {
                  Ok(raw.to_string())
              } else {
                  Err("end tag")
              }
          }

        rule html_comment() -> String
        = s:$("<!--" (!"-->" [_])* "-->") { s.to_string() }

        rule html_tag_name() = quiet!{ ['a'..='z' | 'A'..='Z'] ['a'..='z' | 'A'..='Z' | '0'..='9']* }

        rule html_sp() = quiet!{ [' ' | '\t' | '\n']* }
        rule html_sp1() = quiet!{ [' ' | '\t' | '\n']+ }

        /// An opening (or self-closing) tag: raw text plus lowercased name.
        rule html_open_tag() -> (&'input str, String)
        = raw:$("<" html_tag_name() (html_sp1() html_attribute())* html_sp() "/"? ">")
        { (raw, crate::grammar::tag_name(raw)) }

        rule html_attribute()
        = html_attr_name() (html_sp() "=" html_sp() html_attr_value())?

        rule html_attr_name()
        = quiet!{ ['a'..='z' | 'A'..='Z'] ['a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | ':']* }

        rule html_attr_value()
        = quiet!{
            "\"" [^ '"']* "\""
            / "'" [^ '\'']* "'"
            / [^ ' ' | '\t' | '\n' | '>' | '"' | '\'']+
        }

        // -- Raw LaTeX --------------------------------------------------

        rule latex_environment_block() -> Block
        = parse_raw_on() not_strict() e:latex_environment() sp() "\n"? blank_lines()?
        { Block::Para(vec![Inline::TeX(e)]) }

        rule latex_environment() -> String
        = "\\begin{" name:$([^ '}' | '\n']+) "}" body:latex_env_body(name) close:latex_env_close(name)
        { format!("\\begin{{{name}}}{body}{close}") }

        rule latex_env_close(name: &str) -> String
        = "\\end{" n:$([^ '}' | '\n']+) "}"
          {? if n == name { Ok(format!("\\end{{{n}}}")) } else { Err("environment end") } }

        rule latex_env_body(name: &str) -> String
        = parts:latex_env_piece(name)* { parts.concat() }

        rule latex_env_piece(name: &str) -> String
        = e:latex_environment() { e }
        / run:$((!latex_env_close(name) !"\\begin{" [_])+) { run.to_string() }

        rule latex_command() -> String
        = e:latex_environment() { e }
        / "\\" name:$(['a'..='z' | 'A'..='Z']+) star:$("*"?) args:latex_arg()*
          { format!("\\{name}{star}{}", args.concat()) }

        rule latex_arg() -> String
        = "{" inner:latex_brace_piece()* "}" { format!("{{{}}}", inner.concat()) }
        / "[" inner:$([^ ']' | '\n']*) "]" { format!("[{inner}]") }

        rule latex_brace_piece() -> String
        = a:latex_arg() { a }
        / run:$([^ '{' | '}']+) { run.to_string() }

        // -- Tables -----------------------------------------------------

        rule table() -> Block
        = not_strict() t:(simple_table() / multiline_table()) { t }

        rule dash_segment() -> (usize, usize)
        = ds:$("-"+) spx:$([' ']*) { (ds.len(), ds.len() + spx.len()) }

        rule simple_table() -> Block
        = !blank_line() header:any_line()
          init_sp:$([' ']*) segs:dash_segment()+ "\n"
          rows:simple_table_row()+
          blank_lines()
          caption:table_caption()?
        {?
            let indices = crate::grammar::tables::column_indices(init_sp.len(), &segs);
            let head_raw = crate::grammar::tables::split_row(header, &indices);
            if head_raw.iter().all(|cell| cell.trim().is_empty()) {
                Err("simple table header")
            } else {
                let mut heads = Vec::with_capacity(head_raw.len());
                for cell in &head_raw {
                    heads.push(crate::grammar::table_cell_blocks(state, cell));
                }
                let mut body = Vec::with_capacity(rows.len());
                for row in &rows {
                    let mut cells = Vec::with_capacity(segs.len());
                    for cell in crate::grammar::tables::split_row(row, &indices) {
                        cells.push(crate::grammar::table_cell_blocks(state, &cell));
                    }
                    body.push(cells);
                }
                let aligns = vec![Alignment::Default; segs.len()];
                let widths =
                    crate::grammar::tables::widths_from_indices(state.options.columns, &indices);
                Ok(Block::Table(caption.unwrap_or_default(), aligns, widths, heads, body))
            }
        }

        rule simple_table_row() -> &'input str
        = !blank_line() l:any_line() { l }

        rule multiline_table() -> Block
        = "-" "-"* sp() "\n"
          header_lines:multiline_header_line()+
          init_sp:$([' ']*) segs:dash_segment()+ "\n"
          rows:multiline_row()*
          "-" "-"* sp() "\n" blank_lines()?
          caption:table_caption()?
        {
            let indices = crate::grammar::tables::column_indices(init_sp.len(), &segs);
            let mut head_cols: Vec<Vec<String>> = vec![Vec::new(); segs.len()];
            for line in &header_lines {
                for (i, cell) in crate::grammar::tables::split_row(line, &indices)
                    .into_iter()
                    .enumerate()
                {
                    if let Some(col) = head_cols.get_mut(i) {
                        col.push(cell);
                    }
                }
            }
            let mut heads = Vec::with_capacity(head_cols.len());
            let mut aligns = Vec::with_capacity(head_cols.len());
            for (i, col) in head_cols.iter().enumerate() {
                aligns.push(crate::grammar::tables::align_type(col, segs[i].0));
                let joined = col
                    .iter()
                    .map(|cell| cell.trim())
                    .filter(|cell| !cell.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                heads.push(crate::grammar::table_cell_blocks(state, &joined));
            }
            let mut body = Vec::with_capacity(rows.len());
            for group in &rows {
                let mut cols: Vec<Vec<String>> = vec![Vec::new(); segs.len()];
                for line in group {
                    for (i, cell) in crate::grammar::tables::split_row(line, &indices)
                        .into_iter()
                        .enumerate()
                    {
                        if let Some(col) = cols.get_mut(i) {
                            col.push(cell);
                        }
                    }
                }
                let mut row_cells = Vec::with_capacity(cols.len());
                for col in &cols {
                    let joined = col
                        .iter()
                        .map(|cell| cell.trim())
                        .filter(|cell| !cell.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ");
                    row_cells.push(crate::grammar::table_cell_blocks(state, &joined));
                }
                body.push(row_cells);
            }
            let widths =
                crate::grammar::tables::widths_from_indices(state.options.columns, &indices);
            Block::Table(caption.unwrap_or_default(), aligns, widths, heads, body)
        }

        rule dash_line_peek() = quiet!{ [' ']* "-" ['-' | ' ']* "\n" }

        rule multiline_header_line() -> &'input str
        = !dash_line_peek() !blank_line() l:any_line() { l }

        rule multiline_row() -> Vec<&'input str>
        = lines:(!dash_line_peek() !blank_line() l:any_line() { l })+ blank_line()*
        { lines }

        rule table_caption() -> Vec<Inline>
        = sp() "Table:" sp() l:any_line() blank_lines()?
        { normalize_spaces(crate::grammar::parse_inlines_from(state, l)) }

        // -- Paragraph-level fallthrough --------------------------------

        rule para() -> Block
        = content:(inline(QuoteContext::None))+ "\n" para_end()
        { Block::Para(normalize_spaces(content)) }

        // A paragraph normally ends at a blank line; in strict mode a block
        // quote or header may follow directly, in extended mode an
        // emacs-box quote may.
        rule para_end()
        = blank_lines()
        / is_strict() para_strict_break()
        / not_strict() &",----"

        rule para_strict_break()
        = &(non_indent_spaces() ">")
        / &"#"

        rule plain() -> Block
        = content:(inline(QuoteContext::None))+
        { Block::Plain(normalize_spaces(content)) }

        rule null_block() -> Block
        = blank_lines() { Block::Null }

        // ---------------------------------------------------------------
        // Inlines
        // ---------------------------------------------------------------

        rule inline(qc: QuoteContext) -> Inline
        = str_inline()
        / smart_punctuation(qc)
        / whitespace_inline()
        / endline()
        / code()
        / entity()
        / strong(qc)
        / emph(qc)
        / note_ref()
        / inline_note()
        / link()
        / image()
        / math()
        / strikeout(qc)
        / superscript(qc)
        / subscript(qc)
        / autolink()
        / raw_html_inline()
        / raw_latex_inline()
        / escaped_char()
        / symbol()
        / lt_sign()

        rule str_inline() -> Inline
        = s:$(normal_char()+) { Inline::Str(s.to_string()) }

        // `.`, `-` and the quote characters only start inlines under smart
        // typography; otherwise they belong to ordinary text runs.
        rule normal_char() -> char
        = c:[^ '\\' | '[' | ']' | '*' | '_' | '~' | '`' | '<' | '>' | '$' | '!' | '^'
              | '-' | '.' | '&' | '\'' | '"'
              | '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}'
              | ' ' | '\t' | '\n'] { c }
        / c:['.' | '-' | '\'' | '"' | '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}']
          {? if state.options.smart { Err("smart punctuation") } else { Ok(c) } }

        rule symbol() -> Inline
        = c:$(
            ['\\' | '[' | ']' | '*' | '_' | '~' | '`' | '>' | '$' | '!' | '^'
             | '-' | '.' | '&' | '\'' | '"'
             | '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}']
          )
        { Inline::Str(c.to_string()) }

        rule lt_sign() -> Inline
        = "<" { Inline::Str("<".to_string()) }

        // Two or more trailing spaces before the line end force a hard
        // break; any other whitespace run is a single space.
        rule whitespace_inline() -> Inline
        = " " " "+ endline() { Inline::LineBreak }
        / [' ' | '\t']+ { Inline::Space }

        rule endline() -> Inline
        = "\n" !blank_line() endline_strict_guard() endline_list_guard()
        { Inline::Space }

        rule endline_strict_guard()
        = not_strict()
        / !(non_indent_spaces() ">") !"#"

        rule endline_list_guard()
        = not_in_list_context()
        / !list_start_peek()

        rule not_in_list_context()
        = {?
            if state.parser_context == ParserContext::ListItemState {
                Err("list item context")
            } else {
                Ok(())
            }
        }

        // A code span opened by N backticks closes only on a run of exactly
        // N backticks; newlines inside collapse to spaces.
        rule code() -> Inline
        = ticks:$("`"+) sp() body:code_body(ticks.len())
        { Inline::Code(remove_leading_trailing_space(&body).to_string()) }

        rule code_body(n: usize) -> String
        = first:code_span_part(n) rest:(!code_end(n) p:code_span_part(n) { p })* code_end(n)
        {
            let mut body = first;
            for part in rest {
                body.push_str(&part);
            }
            body
        }

        rule code_span_part(n: usize) -> String
        = bs:$("`"+) {? if bs.len() == n { Err("code end") } else { Ok(bs.to_string()) } }
        / run:$([^ '`' | '\n']+) { run.to_string() }
        / "\n" { " ".to_string() }

        rule code_end(n: usize)
        = sp() bs:$("`"+) {? if bs.len() == n { Ok(()) } else { Err("code end") } }

        rule entity() -> Inline
        = "&" body:$([^ ';' | ' ' | '\t' | '\n' | '&']*<1,8>) ";"
        {?
            crate::entities::decode_entity(body)
                .map(|ch| Inline::Str(ch.to_string()))
                .ok_or("character reference")
        }

        rule strong(qc: QuoteContext) -> Inline
        = "**" ![' ' | '\t' | '\n'] first:inline(qc) rest:(!"**" i:inline(qc) { i })* "**"
          { let mut c = vec![first]; c.extend(rest); Inline::Strong(normalize_spaces(c)) }
        / "__" ![' ' | '\t' | '\n'] first:inline(qc) rest:(!"__" i:inline(qc) { i })* "__"
          { let mut c = vec![first]; c.extend(rest); Inline::Strong(normalize_spaces(c)) }

        rule emph(qc: QuoteContext) -> Inline
        = "*" ![' ' | '\t' | '\n'] first:inline(qc) rest:(!"*" i:inline(qc) { i })* "*"
          { let mut c = vec![first]; c.extend(rest); Inline::Emph(normalize_spaces(c)) }
        / "_" ![' ' | '\t' | '\n'] first:inline(qc) rest:(!"_" i:inline(qc) { i })* "_"
          { let mut c = vec![first]; c.extend(rest); Inline::Emph(normalize_spaces(c)) }

        rule strikeout(qc: QuoteContext) -> Inline
        = not_strict() "~~" ![' ' | '\t' | '\n']
          first:inline(qc) rest:(!"~~" i:inline(qc) { i })* "~~"
        { let mut c = vec![first]; c.extend(rest); Inline::Strikeout(normalize_spaces(c)) }

        rule superscript(qc: QuoteContext) -> Inline
        = not_strict() "^" first:sup_sub_inner(qc) rest:(!"^" i:sup_sub_inner(qc) { i })* "^"
        { let mut c = vec![first]; c.extend(rest); Inline::Superscript(c) }

        rule subscript(qc: QuoteContext) -> Inline
        = not_strict() "~" first:sup_sub_inner(qc) rest:(!"~" i:sup_sub_inner(qc) { i })* "~"
        { let mut c = vec![first]; c.extend(rest); Inline::Subscript(c) }

        rule sup_sub_inner(qc: QuoteContext) -> Inline
        = ![' ' | '\t'] i:inline(qc) { i }

        rule note_ref() -> Inline
        = not_strict() "[^" id:$([^ ']' | ' ' | '\t' | '\n']+) "]"
        {?
            crate::grammar::parse_note_blocks(state, id)
                .map(Inline::Note)
                .ok_or("unknown note")
        }

        rule inline_note() -> Inline
        = not_strict() "^" raw:bracketed_raw()
        {
            Inline::Note(vec![Block::Para(normalize_spaces(
                crate::grammar::parse_inlines_from(state, &raw),
            ))])
        }

        rule link() -> Inline
        = explicit_link()
        / reference_link()

        rule explicit_link() -> Inline
        = raw:bracketed_raw() "(" sp() "<"?
          src:$([^ ')' | '>' | ' ' | '\t' | '\n']*) ">"?
          tit:link_title()? sp() ")"
        {
            let label = normalize_spaces(crate::grammar::parse_inlines_from(state, &raw));
            Inline::Link(label, (src.to_string(), tit.unwrap_or_default()))
        }

        rule link_title() -> String
        = sp() "\"" t:$([^ '"' | '\n']*) "\"" { t.to_string() }
        / sp() "'" t:$([^ '\'' | '\n']*) "'" { t.to_string() }

        // An empty or missing second pair falls back to the label itself.
        // A missing key fails the rule, so the brackets re-parse literally.
        rule reference_link() -> Inline
        = lab:bracketed_raw() refpart:(sp() fold_newline()? sp() r:bracketed_raw() { r })?
        {?
            let key = match &refpart {
                Some(r) if !r.is_empty() => r.as_str(),
                _ => lab.as_str(),
            };
            match state.lookup_key_src(key).cloned() {
                Some(target) => Ok(Inline::Link(
                    normalize_spaces(crate::grammar::parse_inlines_from(state, &lab)),
                    target,
                )),
                None => Err("no matching reference key"),
            }
        }

        rule image() -> Inline
        = "!" l:link()
        {?
            match l {
                Inline::Link(label, target) => Ok(Inline::Image(label, target)),
                _ => Err("image"),
            }
        }

        /// Interior of a bracketed group, nested brackets preserved.
        rule bracketed_raw() -> String
        = "[" parts:bracket_part()* "]" { parts.concat() }

        rule bracket_part() -> String
        = inner:bracketed_raw() { format!("[{inner}]") }
        / run:$((!"\n\n" [^ '[' | ']'])+) { run.to_string() }

        rule math() -> Inline
        = not_strict() "$" ![' ' | '\t' | '\n']
          first:math_word() rest:([' ' | '\t']+ w:math_word() { w })* "$"
        {
            let mut words = vec![first];
            words.extend(rest);
            Inline::Math(join_with_sep(" ", &words))
        }

        rule math_word() -> String
        = parts:math_piece()+ { parts.concat() }

        rule math_piece() -> String
        = "\\$" { "\\$".to_string() }
        / run:$([^ ' ' | '\t' | '\n' | '$' | '\\']+) { run.to_string() }

        rule autolink() -> Inline
        = autolink_email()
        / autolink_uri()

        rule autolink_uri() -> Inline
        = "<" scheme:$("http:" / "ftp:" / "mailto:") rest:$([^ '>' | '\n']+) ">"
        {
            let src = format!("{scheme}{rest}");
            let label = if state.options.strict {
                Inline::Str(src.clone())
            } else {
                Inline::Code(src.clone())
            };
            Inline::Link(vec![label], (src, String::new()))
        }

        rule autolink_email() -> Inline
        = "<" name:$([^ '/' | ':' | '<' | '>' | '@' | ' ' | '\t' | '\n']+)
          "@" domain:$(email_domain_chunk() ("." email_domain_chunk())*) ">"
        {
            let src = format!("{name}@{domain}");
            let label = if state.options.strict {
                Inline::Str(src.clone())
            } else {
                Inline::Code(src.clone())
            };
            Inline::Link(vec![label], (format!("mailto:{src}"), String::new()))
        }

        rule email_domain_chunk()
        = quiet!{ [^ '/' | ':' | '.' | '@' | '<' | '>' | ' ' | '\t' | '\n']+ }

        rule raw_html_inline() -> Inline
        = parse_raw_on() t:inline_html_tag() { Inline::HtmlInline(t) }

        rule inline_html_tag() -> String
        = c:html_comment() { c }
        / t:html_open_tag()
          {? if crate::grammar::is_html_block_tag(&t.1) { Err("block tag") } else { Ok(t.0.to_string()) } }
        / raw:$("</" html_tag_name() html_sp() ">")
          {?
              if crate::grammar::is_html_block_tag(&crate::grammar::tag_name(raw)) {
                  Err("block tag")
              } else {
                  Ok(raw.to_string())
              }
          }

        rule raw_latex_inline() -> Inline
        = parse_raw_on() not_strict() s:latex_command() { Inline::TeX(s) }

        // Unknown escapes keep the literal backslash and leave the next
        // character for the following inline.
        rule escaped_char() -> Inline
        = "\\" c:escapable_char() { Inline::Str(c.to_string()) }
        / "\\" { Inline::Str("\\".to_string()) }

        rule escapable_char() -> char
        = c:[_]
        {?
            if state.options.strict {
                if "\\`*_{}[]()>#+-.!".contains(c) { Ok(c) } else { Err("escape") }
            } else if !c.is_alphanumeric() && c != '\n' {
                Ok(c)
            } else {
                Err("escape")
            }
        }

        // -- Smart typography -------------------------------------------

        rule smart_punctuation(qc: QuoteContext) -> Inline
        = smart_on() r:(quoted(qc) / apostrophe() / dash() / ellipses()) { r }

        rule quoted(qc: QuoteContext) -> Inline
        = single_quoted(qc)
        / double_quoted(qc)

        rule single_quoted(qc: QuoteContext) -> Inline
        = single_quote_start(qc)
          first:inline(QuoteContext::InSingle)
          rest:(!single_quote_end() i:inline(QuoteContext::InSingle) { i })*
          single_quote_end()
        {
            let mut c = vec![first];
            c.extend(rest);
            Inline::Quoted(QuoteType::SingleQuote, normalize_spaces(c))
        }

        // What follows an opener must not read as a closing position or a
        // contraction suffix.
        rule single_quote_start(qc: QuoteContext)
        = not_in_single(qc) ['\'' | '\u{2018}']
          ![')' | '!' | ']' | ',' | '.' | ';' | ':' | '-' | '?' | ' ' | '\t' | '\n']
          !contraction()

        rule not_in_single(qc: QuoteContext)
        = {? if qc == QuoteContext::InSingle { Err("inside single quote") } else { Ok(()) } }

        rule contraction()
        = ("ve" / "ll" / "re" / "s" / "t" / "m") !alphanumeric()

        rule single_quote_end()
        = ['\'' | '\u{2019}'] !alphanumeric()

        rule double_quoted(qc: QuoteContext) -> Inline
        = double_quote_start(qc)
          first:inline(QuoteContext::InDouble)
          rest:(!double_quote_end() i:inline(QuoteContext::InDouble) { i })*
          double_quote_end()
        {
            let mut c = vec![first];
            c.extend(rest);
            Inline::Quoted(QuoteType::DoubleQuote, normalize_spaces(c))
        }

        rule double_quote_start(qc: QuoteContext)
        = not_in_double(qc) ['"' | '\u{201c}'] ![' ' | '\t' | '\n']

        rule not_in_double(qc: QuoteContext)
        = {? if qc == QuoteContext::InDouble { Err("inside double quote") } else { Ok(()) } }

        rule double_quote_end()
        = ['"' | '\u{201d}']

        rule apostrophe() -> Inline
        = ['\'' | '\u{2019}'] { Inline::Apostrophe }

        // An em dash swallows surrounding spaces; an en dash does not.
        rule dash() -> Inline
        = em_dash()
        / en_dash()

        rule em_dash() -> Inline
        = sp() "---" sp() { Inline::EmDash }

        rule en_dash() -> Inline
        = "--" { Inline::EnDash }
        / "-" &['0'..='9'] { Inline::EnDash }

        rule ellipses() -> Inline
        = ("..." / " . . . " / ". . ." / " . . .") { Inline::Ellipses }
    }
}
