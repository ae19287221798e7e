//! IdleSmith rendering: forge display, tab panels, and overlays.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::logic::{self, format_number};
use super::state::UpgradeKind;
use super::{Confirm, SmithGame, Tab};

// Action IDs for click targets. Grouped by panel.
pub const ACT_STRIKE: u16 = 1;
pub const ACT_TAB_FORGE: u16 = 10;
pub const ACT_TAB_UPGRADES: u16 = 11;
pub const ACT_TAB_PRESTIGE: u16 = 12;
pub const ACT_TAB_OPTIONS: u16 = 13;
/// Buy row for upgrade index `i` is `ACT_BUY_BASE + i`.
pub const ACT_BUY_BASE: u16 = 20;
pub const ACT_PRESTIGE: u16 = 30;
pub const ACT_CONFIRM_YES: u16 = 31;
pub const ACT_CONFIRM_NO: u16 = 32;
pub const ACT_SAVE: u16 = 40;
pub const ACT_EXPORT: u16 = 41;
pub const ACT_IMPORT: u16 = 42;
pub const ACT_RESET: u16 = 43;
pub const ACT_DISMISS: u16 = 50;

/// Anvil art — 4 lines, alternating ember glow.
const ANVIL_ART: &[&[&str]] = &[
    &["  ▄▄▄▄▄▄▄▄▄ ", "   ▀██▀▀█▀  ", "    ██▄▄█   ", "  ▄▄██████▄ "],
    &["  ▄▄▄▄▄▄▄▄▄ ", "   ▀██▀▀█▀ ·", "   ·██▄▄█   ", "  ▄▄██████▄ "],
];

/// Anvil art — struck, with sparks flying.
const ANVIL_STRIKE_ART: &[&[&str]] = &[
    &["  ▄▄▄▄▄▄▄▄▄✦", " ✦ ▀██▀▀█▀ ✦", "    ██▄▄█   ", "  ▄▄██████▄ "],
    &[" ✦▄▄▄▄▄▄▄▄▄ ", "   ▀██▀▀█▀✦ ", "  ✦ ██▄▄█   ", "  ▄▄██████▄ "],
];

/// Spinner characters for the passive-income indicator.
const SPINNER: &[char] = &['◐', '◓', '◑', '◒'];

pub fn render(game: &SmithGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let recap_height = if game.offline_recap.is_some() { 1 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),            // forge display
            Constraint::Length(recap_height), // offline recap banner
            Constraint::Length(1),            // tab bar
            Constraint::Min(5),               // panel content
            Constraint::Length(1),            // status line
        ])
        .split(area);

    render_forge_display(game, f, chunks[0], click_state);
    if recap_height > 0 {
        render_offline_recap(game, f, chunks[1], click_state);
    }
    render_tab_bar(game, f, chunks[2], click_state);

    // Overlays replace the panel content; confirm wins over everything.
    if game.confirm.is_some() {
        render_confirm(game, f, chunks[3], click_state);
    } else if game.import_buffer.is_some() {
        render_import_prompt(game, f, chunks[3]);
    } else if let Some(code) = &game.export_code {
        render_export(code, f, chunks[3], click_state);
    } else {
        match game.tab {
            Tab::Forge => render_forge_panel(game, f, chunks[3]),
            Tab::Upgrades => render_upgrades(game, f, chunks[3], click_state),
            Tab::Prestige => render_prestige(game, f, chunks[3], click_state),
            Tab::Options => render_options(f, chunks[3], click_state),
        }
    }

    render_status_line(game, f, chunks[4]);
}

fn render_forge_display(
    game: &SmithGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let save = &game.save;
    let d = save.derived();
    let income = save.income_per_sec();

    let art = if game.click_flash > 0 {
        ANVIL_STRIKE_ART[game.click_flash as usize % ANVIL_STRIKE_ART.len()]
    } else {
        ANVIL_ART[(game.anim_frame / 15) as usize % ANVIL_ART.len()]
    };
    let art_color = if game.click_flash > 0 {
        Color::White
    } else {
        Color::Yellow
    };

    let spinner_idx = (game.anim_frame / 3) as usize % SPINNER.len();
    let spinner = if income > 0.0 { SPINNER[spinner_idx] } else { ' ' };

    let strike_style = if game.click_flash > 0 {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };

    let mut lines: Vec<Line> = Vec::new();

    // Row 0: art + gold balance
    lines.push(Line::from(vec![
        Span::styled(art[0], Style::default().fg(art_color)),
        Span::styled(
            format!(" ⛏ {} gold", format_number(save.gold)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]));

    // Row 1: art + passive income
    lines.push(Line::from(vec![
        Span::styled(art[1], Style::default().fg(art_color)),
        Span::styled(
            format!(" {} {}/sec", spinner, format_number(income)),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]));

    // Row 2: art + strike button
    lines.push(Line::from(vec![
        Span::styled(art[2], Style::default().fg(art_color)),
        Span::styled(" ", Style::default()),
        Span::styled(
            format!("[Space] STRIKE +{}", format_number(d.click)),
            strike_style,
        ),
    ]));

    // Row 3: art + multipliers
    lines.push(Line::from({
        let mut spans = vec![
            Span::styled(art[3], Style::default().fg(art_color)),
            Span::styled(
                format!(" ×{:.2} income", d.global_mult),
                Style::default().fg(Color::Cyan),
            ),
        ];
        if save.prestige.essence > 0.0 {
            spans.push(Span::styled(
                format!("  ✧{} essence", format_number(save.prestige.essence)),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ));
        }
        if save.prestige.count > 0 {
            spans.push(Span::styled(
                format!("  reforged ×{}", save.prestige.count),
                Style::default().fg(Color::DarkGray),
            ));
        }
        spans
    }));

    let borders = if is_narrow_layout(area.width) {
        Borders::TOP | Borders::BOTTOM
    } else {
        Borders::ALL
    };
    let border_color = if game.purchase_flash > 0 {
        Color::White
    } else {
        Color::Yellow
    };
    let title = if game.purchase_flash > 0 {
        " ✦ IdleSmith ✦ "
    } else {
        " IdleSmith "
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(borders)
            .border_style(Style::default().fg(border_color))
            .title(title),
    );
    f.render_widget(widget, area);

    // The whole forge display is one big strike target.
    click_state
        .borrow_mut()
        .add_click_target(area, ACT_STRIKE);
}

fn render_offline_recap(
    game: &SmithGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let Some(secs) = game.offline_recap else {
        return;
    };
    let gained = secs * game.save.income_per_sec();
    let hours = (secs / 3600.0) as u32;
    let mins = ((secs % 3600.0) / 60.0) as u32;
    let away = if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m", mins)
    } else {
        format!("{}s", secs as u32)
    };

    let widget = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" ☽ away {} — the forge earned {} gold ", away, format_number(gained)),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::styled(" tap to dismiss ", Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(widget, area);

    click_state.borrow_mut().add_click_target(area, ACT_DISMISS);
}

fn render_tab_bar(
    game: &SmithGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let tab_style = |tab: Tab, color: Color| -> Style {
        if game.tab == tab {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        }
    };

    let prestige_color = if logic::can_prestige(&game.save) {
        Color::Yellow
    } else {
        Color::Magenta
    };
    let prestige_label = if logic::can_prestige(&game.save) {
        format!("Prestige +{}", format_number(logic::essence_gain(game.save.gold)))
    } else {
        "Prestige".to_string()
    };

    let mut cs = click_state.borrow_mut();
    TabBar::new(" │ ")
        .tab("Forge", tab_style(Tab::Forge, Color::Yellow), ACT_TAB_FORGE)
        .tab("Upgrades", tab_style(Tab::Upgrades, Color::Green), ACT_TAB_UPGRADES)
        .tab(prestige_label, tab_style(Tab::Prestige, prestige_color), ACT_TAB_PRESTIGE)
        .tab("Options", tab_style(Tab::Options, Color::Cyan), ACT_TAB_OPTIONS)
        .render(f, area, &mut cs);
}

fn render_forge_panel(game: &SmithGame, f: &mut Frame, area: Rect) {
    let save = &game.save;
    let d = save.derived();

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(" per strike  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} gold", format_number(d.click)),
            Style::default().fg(Color::Yellow),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled(" per second  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} gold", format_number(d.gps)),
            Style::default().fg(Color::White),
        ),
    ]));
    if d.auto_clicks_per_sec > 0.0 {
        lines.push(Line::from(vec![
            Span::styled(" apprentices ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "{} strikes/sec (+{} gold)",
                    format_number(d.auto_clicks_per_sec),
                    format_number(d.auto_clicks_per_sec * d.click)
                ),
                Style::default().fg(Color::Green),
            ),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled(" multiplier  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!(
                "×{:.2} (forge ×{:.2} · essence ×{:.2})",
                d.global_mult,
                1.0 + save.upgrades.forge as f64 * super::state::FORGE_MULT_STEP,
                1.0 + save.prestige.essence * super::state::ESSENCE_MULT_STEP,
            ),
            Style::default().fg(Color::Cyan),
        ),
    ]));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Forge "),
    );
    f.render_widget(widget, area);
}

fn render_upgrades(
    game: &SmithGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let save = &game.save;
    let mut cl = ClickableList::new();

    for &kind in UpgradeKind::all() {
        let level = save.upgrades.level(kind);
        let cost = logic::upgrade_cost(kind, level);
        let can_afford = save.gold >= cost;

        let key_style = if can_afford {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text_style = if can_afford {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let cost_style = if can_afford {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };

        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!(" [{}] ", kind.key()), key_style),
                Span::styled(format!("{:<10} Lv {:<3} ", kind.name(), level), text_style),
                Span::styled(format!("{:>12} gold  ", format_number(cost)), cost_style),
                Span::styled(kind.description().to_string(), text_style),
            ]),
            ACT_BUY_BASE + kind.index() as u16,
        );
    }

    let border_color = if game.purchase_flash > 0 {
        Color::Yellow
    } else {
        Color::Green
    };
    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, 1, 1);
    }
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Upgrades — 1-4 or tap to buy "),
    );
    f.render_widget(widget, area);
}

fn render_prestige(
    game: &SmithGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let save = &game.save;
    let gain = logic::essence_gain(save.gold);
    let eligible = logic::can_prestige(save);

    let mut cl = ClickableList::new();

    cl.push(Line::from(vec![
        Span::styled(
            format!(" ✧ essence: {} ", format_number(save.prestige.essence)),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("(+2% income each)  reforged {} times", save.prestige.count),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    // Progress toward the threshold
    let progress = (save.gold / logic::PRESTIGE_THRESHOLD).min(1.0);
    let bar_w = 20usize;
    let filled = ((progress * bar_w as f64).round() as usize).min(bar_w);
    let bar: String = "█".repeat(filled) + &"░".repeat(bar_w - filled);
    cl.push(Line::from(vec![
        Span::styled(" progress ", Style::default().fg(Color::DarkGray)),
        Span::styled(bar, Style::default().fg(if eligible { Color::Yellow } else { Color::White })),
        Span::styled(
            format!(
                " {} / {}",
                format_number(save.gold),
                format_number(logic::PRESTIGE_THRESHOLD)
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    cl.push(Line::from(""));

    if eligible {
        let blink = (game.anim_frame / 20) % 2 == 0;
        let style = if blink {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        };
        cl.push_clickable(
            Line::from(Span::styled(
                format!(" [R] Reforge: melt everything down for +{} essence", format_number(gain)),
                style,
            )),
            ACT_PRESTIGE,
        );
        cl.push(Line::from(Span::styled(
            "     gold, upgrades and progress reset; essence is forever",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        cl.push(Line::from(Span::styled(
            format!(
                " reach {} gold to reforge",
                format_number(logic::PRESTIGE_THRESHOLD)
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let border_color = if eligible { Color::Yellow } else { Color::Magenta };
    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, 1, 1);
    }
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Prestige "),
    );
    f.render_widget(widget, area);
}

fn render_options(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let mut cl = ClickableList::new();
    let item_style = Style::default().fg(Color::White);
    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [S] ", key_style),
            Span::styled("Save now", item_style),
        ]),
        ACT_SAVE,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [E] ", key_style),
            Span::styled("Export save code", item_style),
        ]),
        ACT_EXPORT,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [I] ", key_style),
            Span::styled("Import save code", item_style),
        ]),
        ACT_IMPORT,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [X] ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled("Hard reset (wipes essence too)", Style::default().fg(Color::Red)),
        ]),
        ACT_RESET,
    );
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        " autosaves after every change",
        Style::default().fg(Color::DarkGray),
    )));

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, 1, 1);
    }
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Options "),
    );
    f.render_widget(widget, area);
}

fn render_confirm(
    game: &SmithGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let (question, detail) = match game.confirm {
        Some(Confirm::Prestige) => (
            format!(
                " Reforge for +{} essence?",
                format_number(logic::essence_gain(game.save.gold))
            ),
            " gold and upgrades reset; essence and reforge count are kept",
        ),
        Some(Confirm::HardReset) => (
            " Melt down EVERYTHING?".to_string(),
            " all gold, upgrades, essence and reforge history will be lost",
        ),
        None => return,
    };

    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        question,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(Span::styled(
        detail,
        Style::default().fg(Color::DarkGray),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(Span::styled(
            " [Y] yes, do it",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        ACT_CONFIRM_YES,
    );
    cl.push_clickable(
        Line::from(Span::styled(
            " [N] no, keep smithing",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        ACT_CONFIRM_NO,
    );

    {
        let mut cs = click_state.borrow_mut();
        cl.register_targets(area, &mut cs, 1, 1);
    }
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Confirm "),
    );
    f.render_widget(widget, area);
}

fn render_import_prompt(game: &SmithGame, f: &mut Frame, area: Rect) {
    let buffer = game.import_buffer.as_deref().unwrap_or("");
    let cursor = if (game.anim_frame / 30) % 2 == 0 { "█" } else { " " };

    let lines = vec![
        Line::from(Span::styled(
            " paste or type a save code:",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(" > ", Style::default().fg(Color::Cyan)),
            Span::styled(buffer.to_string(), Style::default().fg(Color::Yellow)),
            Span::styled(cursor.to_string(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " Enter to import · Backspace to edit · Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Import save "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_export(
    code: &str,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let lines = vec![
        Line::from(Span::styled(
            " copy this code to move your save:",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            code.to_string(),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Esc or tap to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Export save "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);

    click_state.borrow_mut().add_click_target(area, ACT_DISMISS);
}

fn render_status_line(game: &SmithGame, f: &mut Frame, area: Rect) {
    let line = match &game.status {
        Some(msg) => Line::from(Span::styled(
            format!(" {}", msg),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            " space strike · 1-4 buy · f/u/p/o tabs",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}
