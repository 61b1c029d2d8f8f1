use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::domain::HELP_TEXT;
use crate::model::{Model, Status};
use crate::view::PageView;

pub struct LeadUI;

impl LeadUI {
    pub fn new() -> Self {
        LeadUI
    }

    pub fn draw(&self, model: &mut Model, frame: &mut Frame) {
        let [header, stats, body, footer, statusline] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_header(model, frame, header);
        self.draw_stats(model, frame, stats);

        match model.status {
            Status::EMPTY => self.draw_empty(model, frame, body),
            Status::LOADING => self.draw_loading(model, frame, body),
            _ => {
                let page = model.page_view();
                self.draw_cards(model, &page, frame, body);
            }
        }

        self.draw_footer(model, frame, footer);
        self.draw_statusline(model, frame, statusline);

        if model.show_columns() {
            self.draw_column_panel(model, frame);
        }
        if model.show_help() {
            self.draw_help(frame);
        }
    }

    fn draw_header(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            " leadtv ".bold(),
            model.source_name().to_string().yellow(),
        ]);
        frame.render_widget(Paragraph::new(title), area);
    }

    fn draw_stats(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let stats = model.stats();
        let flags = model.filters().stats;
        let toggle = |on: bool, label: &str, count: usize| -> Span<'static> {
            let text = format!(" {label}: {count} ");
            if on { text.reversed() } else { text.into() }
        };
        let line = Line::from(vec![
            format!(" Leads: {} ", stats.filtered).into(),
            toggle(flags.specialty, "Especialidade", stats.with_specialty),
            toggle(flags.location, "Local", stats.with_location),
            toggle(flags.whatsapp, "WhatsApp", stats.with_whatsapp),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_empty(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let text = match model.load_error() {
            Some(error) => Text::from(vec![
                Line::from("❌ Erro ao carregar dados.".bold().red()),
                Line::from(error.to_string()),
            ]),
            None => Text::from("No data loaded."),
        };
        frame.render_widget(Paragraph::new(text).centered(), area);
    }

    fn draw_loading(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let progress = model.load_progress();
        let text = format!(
            "Loading ... {}% ({}/{})",
            progress.percent(),
            progress.ingested,
            progress.total
        );
        frame.render_widget(Paragraph::new(text).centered(), area);
    }

    fn draw_cards(&self, model: &Model, page: &PageView, frame: &mut Frame, area: Rect) {
        if page.cards.is_empty() {
            let text = Paragraph::new("Nenhum resultado encontrado.").centered();
            frame.render_widget(text, area);
            return;
        }

        let mut lines: Vec<Line> = Vec::new();
        for (idx, card) in page.cards.iter().enumerate() {
            let mut title: Vec<Span> = Vec::new();
            title.push(if idx == model.selected_card() {
                format!("▶ {}", card.name).bold().reversed()
            } else {
                format!("  {}", card.name).bold()
            });
            if let Some(handle) = &card.handle {
                title.push(" ".into());
                title.push(handle.clone().cyan());
            }
            if card.whatsapp {
                title.push(" [WhatsApp]".green());
            }
            lines.push(Line::from(title));

            for (label, value) in card.details.iter() {
                lines.push(Line::from(vec![
                    format!("    {label}: ").dark_gray(),
                    value.clone().into(),
                ]));
            }
            lines.push(Line::from(""));
        }

        // Keep the selected card in view by scrolling whole cards.
        let selected_line: usize = page
            .cards
            .iter()
            .take(model.selected_card())
            .map(|c| c.details.len() + 2)
            .sum();
        let scroll = selected_line.saturating_sub(area.height.saturating_sub(4) as usize);

        let paragraph = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .scroll((scroll as u16, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let pager = model.pager();
        let line = format!(
            " Page {}/{} · {} per page · {}/{} leads ",
            pager.page(),
            pager.total_pages(model.nrows()),
            pager.page_size(),
            model.nrows(),
            model.total_records(),
        );
        frame.render_widget(Paragraph::new(line).dark_gray(), area);
    }

    fn draw_statusline(&self, model: &Model, frame: &mut Frame, area: Rect) {
        if let Some(prompt) = model.prompt() {
            let line = Line::from(vec![
                format!(" {}: ", prompt.title()).bold(),
                prompt.buffer().to_string().into(),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let curser_x = area.x + prompt.title().len() as u16 + 3 + prompt.curser() as u16;
            frame.set_cursor_position((curser_x.min(area.right().saturating_sub(1)), area.y));
        } else {
            let global = model.filters().global.as_str();
            let mut spans: Vec<Span> = vec![format!(" {}", model.status_message()).into()];
            if !global.is_empty() {
                spans.push(format!("  [search: {global}]").cyan());
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), area);
        }
    }

    fn draw_column_panel(&self, model: &Model, frame: &mut Frame) {
        let area = centered(frame.area(), 44, model.fields().len() as u16 + 2);
        let sort = model.sort_state();
        let lines: Vec<Line> = model
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let mark = if field.visible { "[x]" } else { "[ ]" };
                let arrow = if sort.key.as_deref() == Some(field.key) {
                    if sort.ascending { " ↑" } else { " ↓" }
                } else {
                    ""
                };
                let text = format!(" {mark} {}{arrow}", field.label);
                if idx == model.column_curser() {
                    Line::from(text.reversed())
                } else {
                    Line::from(text)
                }
            })
            .collect();

        let block = Block::bordered()
            .title(" Columns (Space toggle, S sort) ")
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_help(&self, frame: &mut Frame) {
        let area = centered(frame.area(), 60, 28);
        let block = Block::bordered()
            .title(" Help ".bold())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(HELP_TEXT)
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Default for LeadUI {
    fn default() -> Self {
        Self::new()
    }
}
