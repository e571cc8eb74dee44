//! Resolving a user's group input into lessons, with the replies the bot
//! sends for each outcome.

use sked_cache::{ScheduleCache, SheetSource};
use sked_core::{Error as CodeError, GroupCode, LessonRecord};
use sked_sheet::parse_schedule;

/// Outcome of looking up one group.
#[derive(Debug)]
pub enum Lookup {
  /// The input is not a 7-digit code.
  Invalid(CodeError),
  /// No cached tab mentions the group.
  NotFound(GroupCode),
  /// The group's tab was found but yielded no lessons.
  Empty(GroupCode),
  Found(GroupCode, Vec<LessonRecord>),
}

impl Lookup {
  /// User-facing reply for every outcome except [`Lookup::Found`].
  pub fn reply(&self) -> Option<String> {
    match self {
      Self::Invalid(CodeError::EmptyGroupCode) => {
        Some("Не распознал номер группы. Пример: 8251160".to_string())
      }
      Self::Invalid(CodeError::GroupCodeLength { .. }) => {
        Some("❗Номер группы должен содержать ровно 7 цифр.".to_string())
      }
      Self::NotFound(group) => Some(format!(
        "❌ Группа {group} не найдена.\nПроверьте правильность написания номера группы."
      )),
      Self::Empty(group) => Some(format!(
        "ℹ️ Группа {group} найдена, но расписание пустое.\nВозможно, на этой неделе нет занятий."
      )),
      Self::Found(..) => None,
    }
  }
}

pub async fn lookup<S>(cache: &ScheduleCache<S>, input: &str) -> Lookup
where
  S: SheetSource + 'static,
{
  let group = match GroupCode::parse(input) {
    Ok(g) => g,
    Err(e) => return Lookup::Invalid(e),
  };

  let Some(csv) = cache.find_group_schedule_local(&group).await else {
    return Lookup::NotFound(group);
  };

  let lessons = parse_schedule(&csv, &group);
  if lessons.is_empty() {
    Lookup::Empty(group)
  } else {
    Lookup::Found(group, lessons)
  }
}

#[cfg(test)]
mod tests {
  use sked_cache::{CacheStore, Gid};

  use super::*;

  const TAB: &str = "\
День,Время,Неделя,8251160/Группа,,,,,,,,8251161/Группа,,,,,,,
,,,Предмет,Здание,Ауд.1,Ауд.2,Тип,,,Преподаватель,Предмет,Здание,Ауд.1,Ауд.2,Тип,,,Преподаватель
Понедельник,09:00,в,Математика,Гл.корпус,101,,лекция,,,Иванов И.И.,,,,,,,,
";

  struct OneTab;

  impl SheetSource for OneTab {
    async fn fetch(&self, gid: Gid) -> Option<String> { (gid == 0).then(|| TAB.to_string()) }
  }

  async fn cache(dir: &tempfile::TempDir) -> ScheduleCache<OneTab> {
    let cache = ScheduleCache::new(CacheStore::new(OneTab, dir.path()), vec![0]);
    cache.ensure_startup_cache().await;
    cache
  }

  #[tokio::test]
  async fn found_group_has_lessons() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache(&dir).await;

    let Lookup::Found(group, lessons) = lookup(&cache, "825-1160").await else {
      panic!("expected Found");
    };
    assert_eq!(group.as_str(), "8251160");
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].subject, "Математика");
  }

  #[tokio::test]
  async fn group_without_rows_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache(&dir).await;

    let result = lookup(&cache, "8251161").await;
    assert!(matches!(result, Lookup::Empty(_)));
    assert!(result.reply().unwrap().contains("расписание пустое"));
  }

  #[tokio::test]
  async fn unknown_and_invalid_codes() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache(&dir).await;

    let result = lookup(&cache, "9999999").await;
    assert!(matches!(result, Lookup::NotFound(_)));
    assert!(result.reply().unwrap().contains("9999999"));

    let result = lookup(&cache, "09-825").await;
    assert!(matches!(result, Lookup::Invalid(CodeError::GroupCodeLength { digits: 5 })));
    assert!(result.reply().unwrap().contains("ровно 7 цифр"));

    let result = lookup(&cache, "abc").await;
    assert!(matches!(result, Lookup::Invalid(CodeError::EmptyGroupCode)));
  }
}
