use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::common::PaginatedResponse;

/// 彩票类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotteryType {
    pub id: i64,
    pub code: String, // 如 fc_ssq, tc_dlt
    pub name: String, // 如 双色球, 大乐透
    #[serde(default)]
    pub schedule_cron: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub caipiao_id: i64,
}

/// 推荐记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: i64,
    #[serde(alias = "lotteryTypeID")]
    pub lottery_type_id: i64,
    pub numbers: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default, deserialize_with = "deserialize_draw_time")]
    pub draw_time: Option<DateTime<Utc>>,
    pub expected_draw_time: DateTime<Utc>,
    pub draw_number: String,
    #[serde(default)]
    pub is_purchased: bool,
    #[serde(default)]
    pub draw_result: String,
    #[serde(default)]
    pub win_status: String,
    #[serde(default)]
    pub win_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub type RecommendationPage = PaginatedResponse<Recommendation>;

/// 开奖结果，只在已开奖时存在
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOutcome<'a> {
    pub draw_time: DateTime<Utc>,
    pub draw_result: &'a str,
    pub win_status: &'a str,
    pub win_amount: f64,
}

/// 号码分组：主号码与特殊号码（如蓝球）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberGroups {
    pub main: Vec<String>,
    pub special: Vec<String>,
}

impl Recommendation {
    pub fn is_drawn(&self) -> bool {
        self.draw_time.is_some()
    }

    pub fn outcome(&self) -> Option<DrawOutcome<'_>> {
        self.draw_time.map(|draw_time| DrawOutcome {
            draw_time,
            draw_result: &self.draw_result,
            win_status: &self.win_status,
            win_amount: self.win_amount,
        })
    }

    pub fn is_winner(&self) -> bool {
        self.outcome()
            .is_some_and(|o| o.win_status == "win" || o.win_amount > 0.0)
    }

    /// 解析号码，格式如 "01,02,03,04,05,06+07"
    pub fn number_groups(&self) -> NumberGroups {
        match self.numbers.split_once('+') {
            Some((main, special)) => NumberGroups {
                main: split_numbers(main),
                special: split_numbers(special),
            },
            None => NumberGroups {
                main: split_numbers(&self.numbers),
                special: Vec::new(),
            },
        }
    }
}

fn split_numbers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect()
}

// 服务端把未开奖的时间序列化成零值 0001-01-01T00:00:00Z
fn deserialize_draw_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<DateTime<Utc>> = Option::deserialize(deserializer)?;
    Ok(value.filter(|t| t.year() > 1))
}

/// 推荐列表查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationFilter {
    pub code: Option<String>,
    pub draw_number: Option<String>,
    /// 按推荐生成日期筛选
    pub date: Option<NaiveDate>,
}

impl RecommendationFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(code) = self.code.as_ref().filter(|c| !c.is_empty()) {
            pairs.push(("code", code.clone()));
        }
        if let Some(number) = self.draw_number.as_ref().filter(|n| !n.is_empty()) {
            pairs.push(("draw_number", number.clone()));
        }
        if let Some(date) = self.date {
            pairs.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub is_purchased: bool,
}
