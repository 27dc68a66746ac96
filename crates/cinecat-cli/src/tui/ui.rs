//! TUI rendering logic for the movie browser.

use cinecat_api::tmdb::{ImageSize, MovieDetails, MovieSummary, Section, image_url};
use cinecat_store::ReviewStore;
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Tabs, Wrap};

use super::present::{
    LOADING, MISSING, cast_line, date_label, overview_text, page_status, people_list, poster_label,
    rating_label, runtime_label, section_label, title_with_year, votes_label,
};
use super::state::{BrowserState, DetailState, InputMode, Selection};

/// Read-only data drawn next to the session state.
#[derive(Debug)]
pub struct DrawContext<'a> {
    /// Stored reviews.
    pub reviews: &'a ReviewStore,
    /// Region used for certifications.
    pub region: &'a str,
    /// Masked credential, `None` when not configured.
    pub credential_hint: Option<&'a str>,
}

const fn accent() -> Style {
    Style::new().fg(Color::Cyan)
}

const fn heading() -> Style {
    Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

const fn dimmed() -> Style {
    Style::new().fg(Color::DarkGray)
}

/// Draws the browser UI.
pub fn draw(frame: &mut Frame, state: &mut BrowserState, ctx: &DrawContext<'_>) {
    let [header, tabs, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    draw_header(frame, header, state, ctx);
    draw_tabs(frame, tabs, state);
    draw_body(frame, body, state, ctx);
    draw_footer(frame, footer, state);

    if let Some(selection) = &state.selection {
        draw_detail(frame, selection, state, ctx);
    }
    if state.input_mode == InputMode::Credential {
        draw_credential_popover(frame, state);
    }
}

/// Draws the brand, search box, and credential badge.
fn draw_header(frame: &mut Frame, area: Rect, state: &BrowserState, ctx: &DrawContext<'_>) {
    let [brand, search, key] = Layout::horizontal([
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(34),
    ])
    .areas(area);

    let logo = Paragraph::new(Line::from(Span::styled(
        "cinecat",
        accent().add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(logo, brand);

    let (search_text, search_style) = if state.input_mode == InputMode::Search {
        (format!("{}_", state.search_draft), Style::default().fg(Color::Yellow))
    } else if state.search.is_empty() {
        (String::from("Buscar películas…"), dimmed())
    } else {
        (state.search.clone(), Style::default())
    };
    let search_box = Paragraph::new(search_text)
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title(" Buscar: / "));
    frame.render_widget(search_box, search);

    let badge = ctx.credential_hint.map_or_else(
        || Line::from(Span::styled("sin configurar (a)", Style::default().fg(Color::Red))),
        |hint| Line::from(Span::styled(hint.to_owned(), Style::default().fg(Color::Green))),
    );
    let key_box =
        Paragraph::new(badge).block(Block::default().borders(Borders::ALL).title(" API key "));
    frame.render_widget(key_box, key);
}

/// Draws the category tabs.
fn draw_tabs(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let titles: Vec<String> = Section::TABS
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{} {}", i.saturating_add(1), section_label(*s)))
        .collect();
    let selected = Section::TABS.iter().position(|s| *s == state.section);
    let mut tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(accent().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    if selected.is_none() {
        let label = if state.search.is_empty() {
            section_label(Section::Discover)
        } else {
            section_label(Section::Search)
        };
        tabs = tabs.block(Block::default().title(Line::from(label).right_aligned()));
    }
    frame.render_widget(tabs, area);
}

/// Draws the hero panel, list, pager, and error alert.
fn draw_body(frame: &mut Frame, area: Rect, state: &mut BrowserState, ctx: &DrawContext<'_>) {
    if !state.has_credential() {
        let prompt = Paragraph::new(vec![
            Line::from(Span::styled("Configurá tu API key de TMDB", heading())),
            Line::from(""),
            Line::from("Presioná `a` para ingresar una API key v3 o un token de lectura v4."),
            Line::from("También podés exportar TMDB_API_KEY antes de iniciar."),
        ])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(prompt, area);
        return;
    }

    let error_height = if state.error.is_some() { 3 } else { 0 };
    let [alert, hero, list, pager] = Layout::vertical([
        Constraint::Length(error_height),
        Constraint::Length(7),
        Constraint::Min(4),
        Constraint::Length(1),
    ])
    .areas(area);

    if let Some(error) = &state.error {
        let alert_box = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Error "));
        frame.render_widget(alert_box, alert);
    }

    draw_hero(frame, hero, state.items.first(), state.loading);
    draw_list(frame, list, state, ctx);
    draw_pager(frame, pager, state);
}

/// Draws the featured first result.
fn draw_hero(frame: &mut Frame, area: Rect, movie: Option<&MovieSummary>, loading: bool) {
    let lines = match movie {
        Some(movie) => vec![
            Line::from(vec![
                Span::styled(title_with_year(movie), heading()),
                Span::raw("  "),
                Span::styled(rating_label(movie.vote_average), accent()),
                Span::raw("  "),
                Span::raw(date_label(movie.release_date())),
            ]),
            Line::from(Span::styled(
                image_url(movie.backdrop_path(), ImageSize::Original)
                    .unwrap_or_else(|| poster_label(movie.poster_path(), ImageSize::Large)),
                dimmed(),
            )),
            Line::from(overview_text(movie.overview()).to_owned()),
        ],
        None if loading => vec![Line::from(LOADING)],
        None => vec![Line::from("Sin resultados.")],
    };
    let hero = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Destacada "));
    frame.render_widget(hero, area);
}

/// Draws the movie list.
fn draw_list(frame: &mut Frame, area: Rect, state: &mut BrowserState, ctx: &DrawContext<'_>) {
    let header = Row::new(vec!["Título", "Estreno", "Puntaje", "Reseñas"])
        .style(heading())
        .bottom_margin(1);

    let rows: Vec<Row> = state
        .items
        .iter()
        .map(|m| {
            let review_count = ctx.reviews.reviews_for(m.id).len();
            Row::new(vec![
                m.title.clone(),
                date_label(m.release_date()),
                rating_label(m.vote_average),
                if review_count == 0 {
                    String::new()
                } else {
                    review_count.to_string()
                },
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(9),
        Constraint::Length(8),
    ];

    let title = if state.loading {
        format!(" {} · {LOADING} ", section_label(state.section))
    } else {
        format!(" {} ", section_label(state.section))
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(accent().add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(table, area, &mut state.list_state);
}

/// Draws the pager line; disabled controls are dimmed.
fn draw_pager(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let control = |label: &'static str, enabled: bool| {
        Span::styled(label, if enabled { accent() } else { dimmed() })
    };
    let line = Line::from(vec![
        control("◀ Anterior", state.can_go_prev()),
        Span::raw("   "),
        Span::raw(page_status(state.page, state.total_pages())),
        Span::raw("   "),
        control("Siguiente ▶", state.can_go_next()),
    ])
    .centered();
    frame.render_widget(Paragraph::new(line), area);
}

/// Draws the footer with key hints or the transient status.
fn draw_footer(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let hints = match state.input_mode {
        InputMode::Search => "Escribí para buscar | Enter: buscar | Esc: cancelar",
        InputMode::Credential => "Pegá tu API key | Enter: guardar | Supr: borrar la actual | Esc: cancelar",
        InputMode::Review => {
            "Escribí tu reseña | \u{2190}\u{2192}: estrellas | Enter: guardar | Esc: cancelar"
        }
        InputMode::Normal if state.selection.is_some() => {
            "\u{2191}\u{2193}: scroll  0-7: estrellas  r: reseñar  o: TMDB  i: IMDb  h: sitio  Esc: cerrar  q: salir"
        }
        InputMode::Normal => {
            "Tab/1-4: sección  \u{2191}\u{2193}/j/k: mover  \u{2190}\u{2192}: página  Enter: detalle  /: buscar  c: limpiar  r: recargar  a: API key  q: salir"
        }
    };
    let mut lines = vec![Line::from(hints)];
    if let Some(status) = &state.status {
        lines.insert(0, Line::from(Span::styled(status.clone(), accent())));
    }
    let footer = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Returns a rectangle centered in `area`.
fn centered(area: Rect, width: Constraint, height: Constraint) -> Rect {
    let [area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
    let [area] = Layout::vertical([height]).flex(Flex::Center).areas(area);
    area
}

/// Draws the detail modal.
fn draw_detail(
    frame: &mut Frame,
    selection: &Selection,
    state: &BrowserState,
    ctx: &DrawContext<'_>,
) {
    let area = centered(
        frame.area(),
        Constraint::Percentage(85),
        Constraint::Percentage(85),
    );

    let mut lines = vec![Line::from(Span::styled(
        selection.movie.title.clone(),
        heading(),
    ))];
    match &selection.detail {
        DetailState::Loading => lines.push(Line::from(LOADING)),
        DetailState::Failed(message) => lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))),
        DetailState::Loaded(details) => detail_lines(&mut lines, details, ctx.region),
    }

    lines.push(Line::from(""));
    review_lines(&mut lines, selection.movie.id, state, ctx.reviews);

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.detail_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Detalle ")
                .border_style(accent()),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(detail, area);
}

/// Appends the loaded detail record.
fn detail_lines(lines: &mut Vec<Line<'static>>, details: &MovieDetails, region: &str) {
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.trim().is_empty()) {
        lines.push(Line::from(Span::styled(
            tagline.to_owned(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    let field = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, heading()), Span::raw(value)])
    };

    lines.push(field(
        "Póster: ",
        poster_label(details.poster_path(), ImageSize::Medium),
    ));
    lines.push(field(
        "Estreno: ",
        format!(
            "{} · {} · {} · {}",
            date_label(details.release_date()),
            runtime_label(details.runtime),
            details.certification(region).unwrap_or(MISSING),
            details.status.as_deref().unwrap_or(MISSING),
        ),
    ));
    lines.push(field("Géneros: ", people_list(details.genre_names())));
    lines.push(field(
        "Puntaje: ",
        format!(
            "{} ({})",
            rating_label(details.vote_average),
            votes_label(details.vote_count)
        ),
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(overview_text(details.overview()).to_owned()));
    lines.push(Line::from(""));

    let cast: Vec<String> = details.top_cast().iter().map(cast_line).collect();
    lines.push(field(
        "Reparto: ",
        people_list(cast.iter().map(String::as_str)),
    ));
    lines.push(field(
        "Dirección: ",
        people_list(details.directors().iter().map(|d| d.name.as_str())),
    ));
    lines.push(Line::from(""));
    lines.push(field("TMDB (o): ", details.tmdb_url()));
    if let Some(imdb) = details.imdb_url() {
        lines.push(field("IMDb (i): ", imdb));
    }
    if let Some(homepage) = details.homepage() {
        lines.push(field("Sitio (h): ", homepage.to_owned()));
    }
}

/// Appends stored reviews and the composer.
fn review_lines(
    lines: &mut Vec<Line<'static>>,
    movie_id: u64,
    state: &BrowserState,
    reviews: &ReviewStore,
) {
    let stored = reviews.reviews_for(movie_id);
    lines.push(Line::from(Span::styled(
        format!("Reseñas ({})", stored.len()),
        heading(),
    )));
    if stored.is_empty() {
        lines.push(Line::from(Span::styled("Todavía no hay reseñas.", dimmed())));
    }
    for review in stored {
        lines.push(Line::from(vec![
            Span::styled(review.stars(), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::raw(review.comment.clone()),
        ]));
    }

    let draft = cinecat_store::Review::new(state.review_draft.rating, "");
    let composing = state.input_mode == InputMode::Review;
    let comment = if composing {
        format!("{}_", state.review_draft.comment)
    } else if state.review_draft.comment.is_empty() {
        String::from("(r para escribir)")
    } else {
        state.review_draft.comment.clone()
    };
    lines.push(Line::from(vec![
        Span::styled("Tu reseña: ", heading()),
        Span::styled(draft.stars(), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            comment,
            if composing {
                Style::default().fg(Color::Yellow)
            } else {
                dimmed()
            },
        ),
    ]));
}

/// Draws the credential popover.
fn draw_credential_popover(frame: &mut Frame, state: &BrowserState) {
    let area = centered(frame.area(), Constraint::Percentage(60), Constraint::Length(7));
    let popover = Paragraph::new(vec![
        Line::from("API key v3 o token de lectura v4 de TMDB:"),
        Line::from(Span::styled(
            format!("{}_", state.credential_draft),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Se guarda localmente. Vacío mantiene la actual; Supr la borra.",
            dimmed(),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" API key ")
            .border_style(accent()),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(popover, area);
}
